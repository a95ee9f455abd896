//! Event handler trait for community operations.

use async_trait::async_trait;

use super::types::{GroupMetadata, MessageUpdate};

/// Trait for receiving output events from community operations.
///
/// Handlers return nothing: an event cannot fail the operation that
/// emitted it.
#[async_trait]
pub trait CommunityEventHandler: Send + Sync {
    /// Called with freshly fetched metadata (`groups.update`).
    ///
    /// # Arguments
    /// * `groups` - Every community returned by the fetch, ordered by jid
    async fn on_groups_update(&self, groups: Vec<GroupMetadata>);

    /// Called when stored messages change (`messages.update`).
    async fn on_messages_update(&self, updates: Vec<MessageUpdate>);
}
