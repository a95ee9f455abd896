//! Typed records produced and consumed by community operations.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::binary::BinaryNode;

/// Role of a participant inside a community or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Admin,
    SuperAdmin,
}

impl ParticipantRole {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(ParticipantRole::Admin),
            "superadmin" => Some(ParticipantRole::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParticipant {
    pub id: String,
    pub admin: Option<ParticipantRole>,
}

/// Metadata of a community (or of a group, the shape is shared).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetadata {
    pub id: String,
    pub subject: String,
    pub subject_owner: Option<String>,
    pub subject_time: u64,
    pub size: usize,
    pub creation: u64,
    pub owner: Option<String>,
    pub desc: Option<String>,
    pub desc_id: Option<String>,
    pub linked_parent: Option<String>,
    /// Only admins may edit settings.
    pub restrict: bool,
    /// Only admins may send messages.
    pub announce: bool,
    pub is_community: bool,
    pub is_community_announce: bool,
    pub join_approval_mode: bool,
    /// Every member may add participants.
    pub member_add_mode: bool,
    pub participants: Vec<GroupParticipant>,
    pub ephemeral_duration: Option<u32>,
    pub addressing_mode: Option<String>,
}

/// Reduced view of a group linked under a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedGroup {
    pub id: Option<String>,
    pub subject: String,
    pub creation: Option<u64>,
    pub owner: Option<String>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedGroups {
    pub community_jid: String,
    /// True when the queried jid was the community itself.
    pub is_community: bool,
    pub linked_groups: Vec<LinkedGroup>,
}

/// A pending join request, kept as the raw attribute map.
pub type MembershipRequest = BTreeMap<String, String>;

/// Outcome of a participant or membership-request action for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantUpdate {
    /// Remote `error` attribute, `"200"` on success.
    pub status: String,
    pub jid: Option<String>,
    /// Raw response fragment. Absent for membership-request actions.
    pub content: Option<BinaryNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl ParticipantAction {
    pub fn as_tag(&self) -> &'static str {
        match self {
            ParticipantAction::Add => "add",
            ParticipantAction::Remove => "remove",
            ParticipantAction::Promote => "promote",
            ParticipantAction::Demote => "demote",
        }
    }
}

impl Display for ParticipantAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRequestAction {
    Approve,
    Reject,
}

impl MembershipRequestAction {
    pub fn as_tag(&self) -> &'static str {
        match self {
            MembershipRequestAction::Approve => "approve",
            MembershipRequestAction::Reject => "reject",
        }
    }
}

/// Toggleable community settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunitySetting {
    Announcement,
    NotAnnouncement,
    Locked,
    Unlocked,
}

impl CommunitySetting {
    pub fn as_tag(&self) -> &'static str {
        match self {
            CommunitySetting::Announcement => "announcement",
            CommunitySetting::NotAnnouncement => "not_announcement",
            CommunitySetting::Locked => "locked",
            CommunitySetting::Unlocked => "unlocked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAddMode {
    AdminAdd,
    AllMemberAdd,
}

impl MemberAddMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberAddMode::AdminAdd => "admin_add",
            MemberAddMode::AllMemberAdd => "all_member_add",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinApprovalMode {
    On,
    Off,
}

impl JoinApprovalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinApprovalMode::On => "on",
            JoinApprovalMode::Off => "off",
        }
    }
}

/// Identifies a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    pub remote_jid: String,
    pub id: Option<String>,
    pub from_me: bool,
    pub participant: Option<String>,
}

/// Where an invite being accepted came from: a bare chat, or a concrete
/// stored message in that chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOrigin {
    Chat(String),
    Message(MessageKey),
}

impl InviteOrigin {
    pub fn remote_jid(&self) -> &str {
        match self {
            InviteOrigin::Chat(jid) => jid,
            InviteOrigin::Message(key) => &key.remote_jid,
        }
    }

    /// Id of the originating message, when one is known.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            InviteOrigin::Chat(_) => None,
            InviteOrigin::Message(key) => key.id.as_deref(),
        }
    }

    /// Key under which concurrent accepts are serialized.
    pub fn buffer_key(&self) -> String {
        match self.message_id() {
            Some(id) => format!("{}:{id}", self.remote_jid()),
            None => self.remote_jid().to_string(),
        }
    }

    pub fn to_message_key(&self) -> MessageKey {
        match self {
            InviteOrigin::Chat(jid) => MessageKey {
                remote_jid: jid.clone(),
                ..Default::default()
            },
            InviteOrigin::Message(key) => key.clone(),
        }
    }
}

impl From<&str> for InviteOrigin {
    fn from(jid: &str) -> Self {
        InviteOrigin::Chat(jid.to_string())
    }
}

impl From<String> for InviteOrigin {
    fn from(jid: String) -> Self {
        InviteOrigin::Chat(jid)
    }
}

impl From<MessageKey> for InviteOrigin {
    fn from(key: MessageKey) -> Self {
        InviteOrigin::Message(key)
    }
}

/// A v4 (in-chat) group invite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInviteMessage {
    pub group_jid: String,
    pub invite_code: String,
    pub invite_expiration: i64,
    pub group_name: Option<String>,
    pub caption: Option<String>,
}

/// Partial update applied to a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    pub key: MessageKey,
    pub group_invite_message: Option<GroupInviteMessage>,
}

/// The local account, as stored with the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lid: Option<String>,
}

/// Synthetic history entry recorded after joining through an invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMessageInfo {
    pub key: MessageKey,
    pub message_stub_type: u32,
    pub message_stub_parameters: Vec<String>,
    pub participant: Option<String>,
    pub message_timestamp: i64,
}

/// How a history append should be surfaced to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Notify,
    Append,
}
