//! Request builders.
//!
//! One pure function per community operation, each returning the complete
//! `iq` stanza to hand to [`QueryTransport::query`]. Identifiers are passed
//! through as given; malformed ones are rejected by the remote side.
//!
//! [`QueryTransport::query`]: crate::ds::QueryTransport::query

use crate::binary::BinaryNode;
use crate::ds::{build_iq, IqType, COMMUNITY_XMLNS, DIRTY_XMLNS};
use crate::jid::S_WHATSAPP_NET;

use super::types::{
    CommunitySetting, GroupInviteMessage, JoinApprovalMode, MemberAddMode,
    MembershipRequestAction, ParticipantAction,
};

/// Address for requests that are not about one existing community.
pub const GROUP_SERVER_JID: &str = "@g.us";

/// Wrap children into a community `iq`.
pub fn community_query(jid: &str, iq_type: IqType, content: Vec<BinaryNode>) -> BinaryNode {
    build_iq(jid, iq_type, COMMUNITY_XMLNS, content)
}

fn participant_nodes(participants: &[String]) -> Vec<BinaryNode> {
    participants
        .iter()
        .map(|jid| BinaryNode::new("participant").attr("jid", jid.as_str()))
        .collect()
}

// ─────────────────────────── Lookups ───────────────────────────

pub fn metadata_request(jid: &str) -> BinaryNode {
    community_query(
        jid,
        IqType::Get,
        vec![BinaryNode::new("query").attr("request", "interactive")],
    )
}

/// Every community the local account participates in, with participants
/// and descriptions.
pub fn participating_request() -> BinaryNode {
    community_query(
        GROUP_SERVER_JID,
        IqType::Get,
        vec![BinaryNode::new("participating").children(vec![
            BinaryNode::new("participants"),
            BinaryNode::new("description"),
        ])],
    )
}

pub fn sub_groups_request(community_jid: &str) -> BinaryNode {
    community_query(community_jid, IqType::Get, vec![BinaryNode::new("sub_groups")])
}

pub fn membership_requests_list_request(jid: &str) -> BinaryNode {
    community_query(
        jid,
        IqType::Get,
        vec![BinaryNode::new("membership_approval_requests")],
    )
}

// ─────────────────────────── Lifecycle ───────────────────────────

/// Create a community. New communities require approval to join, allow
/// members to create sub groups, and get a general chat.
pub fn create_request(subject: &str, body: Option<&str>, description_id: &str) -> BinaryNode {
    community_query(
        GROUP_SERVER_JID,
        IqType::Set,
        vec![BinaryNode::new("create")
            .attr("subject", subject)
            .children(vec![
                BinaryNode::new("description")
                    .attr("id", description_id)
                    .child(BinaryNode::new("body").bytes(body.unwrap_or_default().as_bytes())),
                BinaryNode::new("parent")
                    .attr("default_membership_approval_mode", "request_required"),
                BinaryNode::new("allow_non_admin_sub_group_creation"),
                BinaryNode::new("create_general_chat"),
            ])],
    )
}

/// Create a group already linked under `parent_community_jid`.
pub fn create_group_request(
    subject: &str,
    participants: &[String],
    parent_community_jid: &str,
    key: &str,
) -> BinaryNode {
    let mut content = participant_nodes(participants);
    content.push(BinaryNode::new("linked_parent").attr("jid", parent_community_jid));
    community_query(
        GROUP_SERVER_JID,
        IqType::Set,
        vec![BinaryNode::new("create")
            .attr("subject", subject)
            .attr("key", key)
            .children(content)],
    )
}

pub fn leave_request(id: &str) -> BinaryNode {
    community_query(
        GROUP_SERVER_JID,
        IqType::Set,
        vec![BinaryNode::new("leave").child(BinaryNode::new("community").attr("id", id))],
    )
}

pub fn subject_request(jid: &str, subject: &str) -> BinaryNode {
    community_query(
        jid,
        IqType::Set,
        vec![BinaryNode::new("subject").bytes(subject.as_bytes())],
    )
}

/// Set or, for an empty description, delete the description.
///
/// `prev` is the id of the description being replaced, if any.
pub fn description_request(
    jid: &str,
    description: Option<&str>,
    new_id: &str,
    prev: Option<&str>,
) -> BinaryNode {
    let mut node = BinaryNode::new("description");
    match description.filter(|d| !d.is_empty()) {
        Some(desc) => {
            node = node
                .attr("id", new_id)
                .child(BinaryNode::new("body").bytes(desc.as_bytes()));
        }
        None => node = node.attr("delete", "true"),
    }
    if let Some(prev) = prev {
        node = node.attr("prev", prev);
    }
    community_query(jid, IqType::Set, vec![node])
}

// ─────────────────────────── Linking ───────────────────────────

pub fn link_group_request(group_jid: &str, parent_community_jid: &str) -> BinaryNode {
    community_query(
        parent_community_jid,
        IqType::Set,
        vec![BinaryNode::new("links").child(
            BinaryNode::new("link")
                .attr("link_type", "sub_group")
                .child(BinaryNode::new("group").attr("jid", group_jid)),
        )],
    )
}

pub fn unlink_group_request(group_jid: &str, parent_community_jid: &str) -> BinaryNode {
    community_query(
        parent_community_jid,
        IqType::Set,
        vec![BinaryNode::new("unlink")
            .attr("unlink_type", "sub_group")
            .child(BinaryNode::new("group").attr("jid", group_jid))],
    )
}

// ─────────────────────────── Membership ───────────────────────────

pub fn membership_requests_action_request(
    jid: &str,
    participants: &[String],
    action: MembershipRequestAction,
) -> BinaryNode {
    community_query(
        jid,
        IqType::Set,
        vec![BinaryNode::new("membership_requests_action")
            .child(BinaryNode::new(action.as_tag()).children(participant_nodes(participants)))],
    )
}

/// Removing from a community also removes from its linked groups.
pub fn participants_update_request(
    jid: &str,
    participants: &[String],
    action: ParticipantAction,
) -> BinaryNode {
    let mut node = BinaryNode::new(action.as_tag());
    if action == ParticipantAction::Remove {
        node = node.attr("linked_groups", "true");
    }
    community_query(
        jid,
        IqType::Set,
        vec![node.children(participant_nodes(participants))],
    )
}

// ─────────────────────────── Invites ───────────────────────────

pub fn invite_code_request(jid: &str) -> BinaryNode {
    community_query(jid, IqType::Get, vec![BinaryNode::new("invite")])
}

pub fn revoke_invite_request(jid: &str) -> BinaryNode {
    community_query(jid, IqType::Set, vec![BinaryNode::new("invite")])
}

pub fn accept_invite_request(code: &str) -> BinaryNode {
    community_query(
        GROUP_SERVER_JID,
        IqType::Set,
        vec![BinaryNode::new("invite").attr("code", code)],
    )
}

pub fn invite_info_request(code: &str) -> BinaryNode {
    community_query(
        GROUP_SERVER_JID,
        IqType::Get,
        vec![BinaryNode::new("invite").attr("code", code)],
    )
}

pub fn revoke_invite_v4_request(community_jid: &str, invited_jid: &str) -> BinaryNode {
    community_query(
        community_jid,
        IqType::Set,
        vec![BinaryNode::new("revoke")
            .child(BinaryNode::new("participant").attr("jid", invited_jid))],
    )
}

/// Accept an in-chat invite sent by `admin`.
pub fn accept_invite_v4_request(invite: &GroupInviteMessage, admin: &str) -> BinaryNode {
    community_query(
        &invite.group_jid,
        IqType::Set,
        vec![BinaryNode::new("accept")
            .attr("code", invite.invite_code.as_str())
            .attr("expiration", invite.invite_expiration.to_string())
            .attr("admin", admin)],
    )
}

// ─────────────────────────── Settings ───────────────────────────

/// Zero turns disappearing messages off.
pub fn toggle_ephemeral_request(jid: &str, expiration: u32) -> BinaryNode {
    let content = if expiration > 0 {
        BinaryNode::new("ephemeral").attr("expiration", expiration.to_string())
    } else {
        BinaryNode::new("not_ephemeral")
    };
    community_query(jid, IqType::Set, vec![content])
}

pub fn setting_update_request(jid: &str, setting: CommunitySetting) -> BinaryNode {
    community_query(jid, IqType::Set, vec![BinaryNode::new(setting.as_tag())])
}

pub fn member_add_mode_request(jid: &str, mode: MemberAddMode) -> BinaryNode {
    community_query(
        jid,
        IqType::Set,
        vec![BinaryNode::new("member_add_mode").text(mode.as_str())],
    )
}

pub fn join_approval_mode_request(jid: &str, mode: JoinApprovalMode) -> BinaryNode {
    community_query(
        jid,
        IqType::Set,
        vec![BinaryNode::new("membership_approval_mode")
            .child(BinaryNode::new("community_join").attr("state", mode.as_str()))],
    )
}

// ─────────────────────────── Dirty bits ───────────────────────────

/// Acknowledge a dirty push so the server stops resending it.
pub fn clean_dirty_bits_request(kind: &str, from_timestamp: Option<i64>) -> BinaryNode {
    let mut clean = BinaryNode::new("clean").attr("type", kind);
    if let Some(ts) = from_timestamp {
        clean = clean.attr("timestamp", ts.to_string());
    }
    build_iq(S_WHATSAPP_NET, IqType::Set, DIRTY_XMLNS, vec![clean])
}
