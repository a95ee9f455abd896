//! Collaborators the community layer relies on.
//!
//! The [`SocketServices`] trait bundles what other socket subsystems own:
//! the group metadata cache, the message history, and the local credentials.
//! The community layer calls into them but never persists anything itself.

use async_trait::async_trait;

use super::error::CoreError;
use super::types::{Contact, GroupMetadata, UpsertKind, WebMessageInfo};

#[async_trait]
pub trait SocketServices: Send + Sync + 'static {
    /// Fetch (or serve from cache) the metadata of any group by jid.
    async fn group_metadata(&self, jid: &str) -> Result<GroupMetadata, CoreError>;

    /// Append a message to the local history.
    async fn upsert_message(&self, msg: WebMessageInfo, kind: UpsertKind)
        -> Result<(), CoreError>;

    /// The signed-in account, if credentials are loaded.
    fn me(&self) -> Option<Contact>;
}
