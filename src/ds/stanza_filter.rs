//! Inbound stanza routing keys and a small allowlist built on them.
use std::collections::HashSet;

use tokio::sync::RwLock;

use crate::binary::BinaryNode;

/// Route key for an inbound push, written `tag,attr:value,child`.
///
/// Empty segments match anything, so `ib,,dirty` selects every `ib` stanza
/// whose first child is `dirty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StanzaKey {
    pub tag: String,
    pub attr: Option<(String, String)>,
    pub child: Option<String>,
}

impl StanzaKey {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr: None,
            child: None,
        }
    }

    /// Parse the `tag,attr:value,child` form. The attribute segment may be
    /// a bare key, which matches any value.
    pub fn parse(route: &str) -> Self {
        let mut parts = route.splitn(3, ',');
        let tag = parts.next().unwrap_or_default().to_string();
        let attr = parts.next().filter(|s| !s.is_empty()).map(|s| match s.split_once(':') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (s.to_string(), String::new()),
        });
        let child = parts
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { tag, attr, child }
    }

    pub fn matches(&self, node: &BinaryNode) -> bool {
        if node.tag != self.tag {
            return false;
        }
        if let Some((key, value)) = &self.attr {
            match node.get_attr(key) {
                Some(v) if value.is_empty() || v == value => {}
                _ => return false,
            }
        }
        match &self.child {
            Some(child) => node
                .child_nodes()
                .first()
                .is_some_and(|first| &first.tag == child),
            None => true,
        }
    }
}

/// Allowlist of routes for inbound pushes.
#[derive(Default, Debug)]
pub struct StanzaFilter {
    set: RwLock<HashSet<StanzaKey>>,
}

impl StanzaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter pre-populated with one route.
    pub fn with_route(route: &str) -> Self {
        let mut set = HashSet::new();
        set.insert(StanzaKey::parse(route));
        Self {
            set: RwLock::new(set),
        }
    }

    pub async fn add(&self, route: &str) {
        self.set.write().await.insert(StanzaKey::parse(route));
    }

    pub async fn remove(&self, route: &str) {
        let key = StanzaKey::parse(route);
        self.set.write().await.remove(&key);
    }

    /// Whether any registered route matches the stanza.
    pub async fn accepts(&self, node: &BinaryNode) -> bool {
        self.set.read().await.iter().any(|k| k.matches(node))
    }

    pub async fn snapshot(&self) -> Vec<StanzaKey> {
        self.set.read().await.iter().cloned().collect()
    }
}
