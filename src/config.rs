//! Runtime configuration for the community layer.

use anyhow::Context;
use serde::Deserialize;

/// Knobs of the community layer. Protocol constants (namespaces, servers)
/// are not configurable and live next to the builders.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommunityConfig {
    /// Dirty push category that triggers a resync.
    pub dirty_category: String,
    /// Category named in the acknowledgment sent after the resync.
    pub clean_category: String,
    /// Length of generated description ids.
    pub description_id_len: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            dirty_category: "communities".to_string(),
            clean_category: "groups".to_string(),
            description_id_len: 12,
        }
    }
}

impl CommunityConfig {
    /// Defaults overridden by `COMMUNITY_DIRTY_CATEGORY`,
    /// `COMMUNITY_CLEAN_CATEGORY` and `COMMUNITY_DESCRIPTION_ID_LEN` when set.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("COMMUNITY_DIRTY_CATEGORY") {
            config.dirty_category = v;
        }
        if let Ok(v) = std::env::var("COMMUNITY_CLEAN_CATEGORY") {
            config.clean_category = v;
        }
        if let Ok(v) = std::env::var("COMMUNITY_DESCRIPTION_ID_LEN") {
            config.description_id_len = v
                .parse()
                .context(format!("Failed to parse COMMUNITY_DESCRIPTION_ID_LEN: {v}"))?;
        }
        Ok(config)
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse community config")
    }
}
