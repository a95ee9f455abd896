//! Community operations.
//!
//! [`CommunitySocket`] layers every community operation on a
//! [`QueryTransport`]: build the request, send it, extract the response.
//! Transport errors are returned unchanged; nothing is retried.
//!
//! # Overview
//!
//! ## Lookups
//! - [`CommunitySocket::metadata`], [`CommunitySocket::fetch_all_participating`]
//! - [`CommunitySocket::fetch_linked_groups`], [`CommunitySocket::invite_info`]
//!
//! ## Lifecycle
//! - [`CommunitySocket::create`], [`CommunitySocket::create_group`],
//!   [`CommunitySocket::leave`]
//!
//! ## Membership
//! - [`CommunitySocket::participants_update`],
//!   [`CommunitySocket::request_participants_list`],
//!   [`CommunitySocket::request_participants_update`]
//!
//! ## Invites
//! - [`CommunitySocket::invite_code`], [`CommunitySocket::revoke_invite`],
//!   [`CommunitySocket::accept_invite`], [`CommunitySocket::revoke_invite_v4`],
//!   [`CommunitySocket::accept_invite_v4`]
//!
//! ## Dirty bits
//! - [`CommunitySocket::handle_dirty_push`] (driven by
//!   [`spawn_dirty_listener`](crate::app::spawn_dirty_listener))

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error, info};

use crate::app::{DirtyOutcome, DirtyState, DirtyTracker, KeyedSerializer};
use crate::binary::{get_binary_node_child, BinaryNode};
use crate::config::CommunityConfig;
use crate::ds::QueryTransport;
use crate::jid::{jid_encode, G_US};
use crate::utils::{generate_message_id, generate_message_id_v2, unix_timestamp_seconds};

use super::error::CoreError;
use super::events::CommunityEventHandler;
use super::extract;
use super::provider::SocketServices;
use super::requests;
use super::types::{
    CommunitySetting, GroupInviteMessage, GroupMetadata, InviteOrigin, JoinApprovalMode,
    LinkedGroups, MemberAddMode, MembershipRequest, MembershipRequestAction, MessageKey,
    MessageUpdate, ParticipantAction, ParticipantUpdate, UpsertKind, WebMessageInfo,
};

/// Stub type recorded in history after joining through an in-chat invite.
pub const INVITE_JOIN_STUB_TYPE: u32 = 21;

/// Community operations over a socket.
///
/// The type parameter `T` is the transport the requests go through, `S`
/// the collaborating socket subsystems (metadata cache, history,
/// credentials), and `H` the receiver of emitted events.
pub struct CommunitySocket<T: QueryTransport, S: SocketServices, H: CommunityEventHandler> {
    transport: Arc<T>,
    services: Arc<S>,
    handler: Arc<H>,
    config: CommunityConfig,
    invite_buffer: KeyedSerializer,
    dirty: DirtyTracker,
}

impl<T, S, H> CommunitySocket<T, S, H>
where
    T: QueryTransport,
    S: SocketServices,
    H: CommunityEventHandler + 'static,
{
    pub fn new(transport: Arc<T>, services: Arc<S>, handler: Arc<H>) -> Self {
        Self::new_with_config(transport, services, handler, CommunityConfig::default())
    }

    pub fn new_with_config(
        transport: Arc<T>,
        services: Arc<S>,
        handler: Arc<H>,
        config: CommunityConfig,
    ) -> Self {
        Self {
            transport,
            services,
            handler,
            config,
            invite_buffer: KeyedSerializer::new(),
            dirty: DirtyTracker::new(),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn config(&self) -> &CommunityConfig {
        &self.config
    }

    /// Current state of the communities dirty bit.
    pub fn dirty_state(&self) -> DirtyState {
        self.dirty.state()
    }

    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, CoreError> {
        Ok(self.transport.query(node).await?)
    }

    // ─────────────────────────── Lookups ───────────────────────────

    /// Fetch the metadata of one community.
    pub async fn metadata(&self, jid: &str) -> Result<GroupMetadata, CoreError> {
        let result = self.query(requests::metadata_request(jid)).await?;
        extract::extract_community_metadata(&result)
    }

    /// Fetch every community the local account participates in and emit
    /// them as one `groups.update`.
    ///
    /// # Returns
    /// The fetched communities keyed by canonical jid.
    pub async fn fetch_all_participating(
        &self,
    ) -> Result<BTreeMap<String, GroupMetadata>, CoreError> {
        let result = self.query(requests::participating_request()).await?;
        let data = extract::extract_participating(&result);
        info!(
            "[fetch_all_participating]: Fetched {} communities",
            data.len()
        );
        self.handler
            .on_groups_update(data.values().cloned().collect())
            .await;
        Ok(data)
    }

    /// List the groups linked to a community.
    ///
    /// `jid` may be the community or any group linked under it; a linked
    /// group resolves to its parent first.
    pub async fn fetch_linked_groups(&self, jid: &str) -> Result<LinkedGroups, CoreError> {
        let metadata = self.services.group_metadata(jid).await?;
        let (community_jid, is_community) = match metadata.linked_parent {
            Some(parent) => (parent, false),
            None => (jid.to_string(), true),
        };

        let result = self
            .query(requests::sub_groups_request(&community_jid))
            .await?;
        Ok(LinkedGroups {
            community_jid,
            is_community,
            linked_groups: extract::extract_linked_groups(&result),
        })
    }

    /// Preview the community behind an invite code without joining.
    pub async fn invite_info(&self, code: &str) -> Result<GroupMetadata, CoreError> {
        let result = self.query(requests::invite_info_request(code)).await?;
        extract::extract_community_metadata(&result)
    }

    // ─────────────────────────── Lifecycle ───────────────────────────

    /// Create a community.
    ///
    /// # Returns
    /// Metadata of the created community, or `None` when the response names
    /// no group or its metadata could not be fetched.
    pub async fn create(
        &self,
        subject: &str,
        body: Option<&str>,
    ) -> Result<Option<GroupMetadata>, CoreError> {
        let description_id: String = generate_message_id()
            .chars()
            .take(self.config.description_id_len)
            .collect();
        let result = self
            .query(requests::create_request(subject, body, &description_id))
            .await?;
        Ok(self.parse_group_result(&result).await)
    }

    /// Create a group linked under `parent_community_jid`.
    pub async fn create_group(
        &self,
        subject: &str,
        participants: &[String],
        parent_community_jid: &str,
    ) -> Result<Option<GroupMetadata>, CoreError> {
        let key = generate_message_id_v2(None);
        let result = self
            .query(requests::create_group_request(
                subject,
                participants,
                parent_community_jid,
                &key,
            ))
            .await?;
        Ok(self.parse_group_result(&result).await)
    }

    /// Resolve the group named in a create response through the metadata
    /// collaborator. Lookup failures are logged and degrade to `None`.
    async fn parse_group_result(&self, node: &BinaryNode) -> Option<GroupMetadata> {
        debug!("[parse_group_result]: {node:?}");
        let id = extract::extract_created_group_id(node)?;
        let jid = jid_encode(&id, G_US, None, None);
        match self.services.group_metadata(&jid).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                error!("[parse_group_result]: Failed to fetch metadata for {jid}: {e}");
                None
            }
        }
    }

    pub async fn leave(&self, id: &str) -> Result<(), CoreError> {
        info!("[leave]: Leaving community {id}");
        self.query(requests::leave_request(id)).await?;
        Ok(())
    }

    pub async fn update_subject(&self, jid: &str, subject: &str) -> Result<(), CoreError> {
        self.query(requests::subject_request(jid, subject)).await?;
        Ok(())
    }

    /// Set the description, or delete it when `description` is empty.
    ///
    /// Fetches the current metadata first so the replaced description id
    /// can be sent along.
    pub async fn update_description(
        &self,
        jid: &str,
        description: Option<&str>,
    ) -> Result<(), CoreError> {
        let metadata = self.metadata(jid).await?;
        let new_id = generate_message_id();
        self.query(requests::description_request(
            jid,
            description,
            &new_id,
            metadata.desc_id.as_deref(),
        ))
        .await?;
        Ok(())
    }

    // ─────────────────────────── Linking ───────────────────────────

    pub async fn link_group(
        &self,
        group_jid: &str,
        parent_community_jid: &str,
    ) -> Result<(), CoreError> {
        self.query(requests::link_group_request(group_jid, parent_community_jid))
            .await?;
        Ok(())
    }

    pub async fn unlink_group(
        &self,
        group_jid: &str,
        parent_community_jid: &str,
    ) -> Result<(), CoreError> {
        self.query(requests::unlink_group_request(
            group_jid,
            parent_community_jid,
        ))
        .await?;
        Ok(())
    }

    // ─────────────────────────── Membership ───────────────────────────

    /// Pending join requests awaiting admin action.
    pub async fn request_participants_list(
        &self,
        jid: &str,
    ) -> Result<Vec<MembershipRequest>, CoreError> {
        let result = self
            .query(requests::membership_requests_list_request(jid))
            .await?;
        Ok(extract::extract_membership_requests(&result))
    }

    /// Approve or reject pending join requests.
    pub async fn request_participants_update(
        &self,
        jid: &str,
        participants: &[String],
        action: MembershipRequestAction,
    ) -> Result<Vec<ParticipantUpdate>, CoreError> {
        let result = self
            .query(requests::membership_requests_action_request(
                jid,
                participants,
                action,
            ))
            .await?;
        Ok(extract::extract_request_action_results(&result, action))
    }

    /// Add, remove, promote or demote participants.
    pub async fn participants_update(
        &self,
        jid: &str,
        participants: &[String],
        action: ParticipantAction,
    ) -> Result<Vec<ParticipantUpdate>, CoreError> {
        info!(
            "[participants_update]: {action} {} participants in {jid}",
            participants.len()
        );
        let result = self
            .query(requests::participants_update_request(
                jid,
                participants,
                action,
            ))
            .await?;
        Ok(extract::extract_participant_results(&result, action))
    }

    // ─────────────────────────── Invites ───────────────────────────

    pub async fn invite_code(&self, jid: &str) -> Result<Option<String>, CoreError> {
        let result = self.query(requests::invite_code_request(jid)).await?;
        Ok(extract::extract_invite_code(&result))
    }

    /// Revoke the current invite code; returns the replacement.
    pub async fn revoke_invite(&self, jid: &str) -> Result<Option<String>, CoreError> {
        let result = self.query(requests::revoke_invite_request(jid)).await?;
        Ok(extract::extract_invite_code(&result))
    }

    /// Join through an invite code; returns the joined community's jid.
    pub async fn accept_invite(&self, code: &str) -> Result<Option<String>, CoreError> {
        let result = self.query(requests::accept_invite_request(code)).await?;
        Ok(extract::extract_accepted_community(&result))
    }

    /// Revoke an in-chat invite previously sent to `invited_jid`.
    pub async fn revoke_invite_v4(
        &self,
        community_jid: &str,
        invited_jid: &str,
    ) -> Result<bool, CoreError> {
        self.query(requests::revoke_invite_v4_request(
            community_jid,
            invited_jid,
        ))
        .await?;
        Ok(true)
    }

    /// Accept an in-chat invite.
    ///
    /// Calls for the same origin are serialized. When the origin names a
    /// stored message, that message is marked consumed and a
    /// `messages.update` is emitted; a join entry is always appended to the
    /// group's history.
    ///
    /// # Returns
    /// The `from` attribute of the response.
    pub async fn accept_invite_v4(
        &self,
        origin: impl Into<InviteOrigin>,
        invite: GroupInviteMessage,
    ) -> Result<Option<String>, CoreError> {
        let origin = origin.into();
        let key = origin.buffer_key();
        self.invite_buffer
            .run(&key, self.accept_invite_v4_inner(origin, invite))
            .await
    }

    async fn accept_invite_v4_inner(
        &self,
        origin: InviteOrigin,
        mut invite: GroupInviteMessage,
    ) -> Result<Option<String>, CoreError> {
        let admin = origin.remote_jid().to_string();
        let results = self
            .query(requests::accept_invite_v4_request(&invite, &admin))
            .await?;
        info!(
            "[accept_invite_v4]: Accepted invite to {} from {admin}",
            invite.group_jid
        );

        if origin.message_id().is_some() {
            invite.invite_expiration = 0;
            invite.invite_code = String::new();
            self.handler
                .on_messages_update(vec![MessageUpdate {
                    key: origin.to_message_key(),
                    group_invite_message: Some(invite.clone()),
                }])
                .await;
        }

        let me = self.services.me();
        let stub = WebMessageInfo {
            key: MessageKey {
                remote_jid: invite.group_jid.clone(),
                id: Some(generate_message_id_v2(me.as_ref().map(|c| c.id.as_str()))),
                from_me: false,
                participant: Some(admin.clone()),
            },
            message_stub_type: INVITE_JOIN_STUB_TYPE,
            message_stub_parameters: vec![serde_json::to_string(&me)?],
            participant: Some(admin),
            message_timestamp: unix_timestamp_seconds(),
        };
        self.services
            .upsert_message(stub, UpsertKind::Notify)
            .await?;

        Ok(results.get_attr("from").map(str::to_string))
    }

    // ─────────────────────────── Settings ───────────────────────────

    /// Set the disappearing-message timer in seconds; zero turns it off.
    pub async fn toggle_ephemeral(&self, jid: &str, expiration: u32) -> Result<(), CoreError> {
        self.query(requests::toggle_ephemeral_request(jid, expiration))
            .await?;
        Ok(())
    }

    pub async fn setting_update(
        &self,
        jid: &str,
        setting: CommunitySetting,
    ) -> Result<(), CoreError> {
        self.query(requests::setting_update_request(jid, setting))
            .await?;
        Ok(())
    }

    pub async fn member_add_mode(&self, jid: &str, mode: MemberAddMode) -> Result<(), CoreError> {
        self.query(requests::member_add_mode_request(jid, mode))
            .await?;
        Ok(())
    }

    pub async fn join_approval_mode(
        &self,
        jid: &str,
        mode: JoinApprovalMode,
    ) -> Result<(), CoreError> {
        self.query(requests::join_approval_mode_request(jid, mode))
            .await?;
        Ok(())
    }

    // ─────────────────────────── Dirty bits ───────────────────────────

    /// Acknowledge a dirty category.
    pub async fn clean_dirty_bits(
        &self,
        kind: &str,
        from_timestamp: Option<i64>,
    ) -> Result<(), CoreError> {
        debug!("[clean_dirty_bits]: Cleaning {kind}");
        self.query(requests::clean_dirty_bits_request(kind, from_timestamp))
            .await?;
        Ok(())
    }

    /// React to an inbound `ib` push carrying a `dirty` child.
    ///
    /// For the communities category: refetch everything, then acknowledge.
    /// A failed fetch returns before the acknowledgment, leaving the bit set
    /// and the tracker in [`DirtyState::DirtyPending`]. Other categories are
    /// ignored.
    ///
    /// # Errors
    /// [`CoreError::MissingNode`] when the push has no `dirty` child.
    pub async fn handle_dirty_push(&self, node: &BinaryNode) -> Result<DirtyOutcome, CoreError> {
        let dirty =
            get_binary_node_child(Some(node), "dirty").ok_or(CoreError::MissingNode("dirty"))?;
        let category = dirty.get_attr("type").unwrap_or_default();
        if category != self.config.dirty_category {
            debug!("[handle_dirty_push]: Ignoring dirty category {category:?}");
            return Ok(DirtyOutcome::Ignored);
        }

        self.dirty.mark_dirty();
        info!("[handle_dirty_push]: {category} marked dirty, resyncing");
        let fetched = self.fetch_all_participating().await?;
        self.clean_dirty_bits(&self.config.clean_category, None)
            .await?;
        self.dirty.mark_clean();

        Ok(DirtyOutcome::Resynced(fetched.len()))
    }
}
