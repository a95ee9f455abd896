//! Response extractors.
//!
//! Pure functions from a response stanza to typed records. Optional
//! containers that are missing yield empty results; only nodes an operation
//! cannot do without produce [`CoreError::MissingNode`].

use std::collections::BTreeMap;

use log::debug;

use crate::binary::{
    get_binary_node_child, get_binary_node_child_string, get_binary_node_children, BinaryNode,
};
use crate::jid::{canonical_group_jid, jid_encode, jid_normalized_user, G_US};

use super::error::CoreError;
use super::types::{
    GroupMetadata, GroupParticipant, LinkedGroup, MembershipRequest, MembershipRequestAction,
    ParticipantAction, ParticipantRole, ParticipantUpdate,
};

const SUCCESS_STATUS: &str = "200";

fn attr_u64_or_zero(node: &BinaryNode, key: &str) -> u64 {
    node.get_attr(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn attr_u64(node: &BinaryNode, key: &str) -> Option<u64> {
    node.get_attr(key)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Metadata of the `community` child of `result`.
///
/// # Errors
/// [`CoreError::MissingNode`] when `result` has no `community` child.
pub fn extract_community_metadata(result: &BinaryNode) -> Result<GroupMetadata, CoreError> {
    let community =
        get_binary_node_child(Some(result), "community").ok_or(CoreError::MissingNode("community"))?;
    Ok(community_node_metadata(community))
}

/// Metadata of a bare `community` node.
pub fn community_node_metadata(community: &BinaryNode) -> GroupMetadata {
    let node = Some(community);

    let (desc, desc_id) = match get_binary_node_child(node, "description") {
        Some(desc_child) => (
            get_binary_node_child_string(Some(desc_child), "body"),
            desc_child.get_attr("id").map(str::to_string),
        ),
        None => (None, None),
    };

    let participants: Vec<GroupParticipant> = get_binary_node_children(node, "participant")
        .into_iter()
        .map(|p| GroupParticipant {
            id: p.get_attr("jid").unwrap_or_default().to_string(),
            admin: p.get_attr("type").and_then(ParticipantRole::from_attr),
        })
        .collect();

    let ephemeral_duration = get_binary_node_child(node, "ephemeral")
        .and_then(|e| e.get_attr("expiration"))
        .filter(|v| !v.is_empty())
        .and_then(|v| match v.parse() {
            Ok(secs) => Some(secs),
            Err(_) => {
                debug!("[extract_community_metadata]: Ignoring non-numeric expiration {v}");
                None
            }
        });

    let has = |tag: &str| get_binary_node_child(node, tag).is_some();

    GroupMetadata {
        id: canonical_group_jid(community.get_attr("id").unwrap_or_default()),
        subject: community.get_attr("subject").unwrap_or_default().to_string(),
        subject_owner: community.get_attr("s_o").map(str::to_string),
        subject_time: attr_u64_or_zero(community, "s_t"),
        size: participants.len(),
        creation: attr_u64_or_zero(community, "creation"),
        owner: community
            .get_attr("creator")
            .filter(|c| !c.is_empty())
            .map(jid_normalized_user),
        desc,
        desc_id,
        linked_parent: get_binary_node_child(node, "linked_parent")
            .and_then(|p| p.get_attr("jid"))
            .filter(|j| !j.is_empty())
            .map(str::to_string),
        restrict: has("locked"),
        announce: has("announcement"),
        is_community: has("parent"),
        is_community_announce: has("default_sub_community"),
        join_approval_mode: has("membership_approval_mode"),
        member_add_mode: get_binary_node_child_string(node, "member_add_mode").as_deref()
            == Some("all_member_add"),
        participants,
        ephemeral_duration,
        addressing_mode: get_binary_node_child_string(node, "addressing_mode"),
    }
}

/// All communities of a participating listing, keyed by canonical id.
pub fn extract_participating(result: &BinaryNode) -> BTreeMap<String, GroupMetadata> {
    let communities = get_binary_node_child(Some(result), "communities");
    get_binary_node_children(communities, "community")
        .into_iter()
        .map(|node| {
            let meta = community_node_metadata(node);
            (meta.id.clone(), meta)
        })
        .collect()
}

/// Groups listed under `sub_groups`.
pub fn extract_linked_groups(result: &BinaryNode) -> Vec<LinkedGroup> {
    let sub_groups = get_binary_node_child(Some(result), "sub_groups");
    get_binary_node_children(sub_groups, "group")
        .into_iter()
        .map(|group| LinkedGroup {
            id: group
                .get_attr("id")
                .filter(|id| !id.is_empty())
                .map(|id| jid_encode(id, G_US, None, None)),
            subject: group.get_attr("subject").unwrap_or_default().to_string(),
            creation: attr_u64(group, "creation"),
            owner: group
                .get_attr("creator")
                .filter(|c| !c.is_empty())
                .map(jid_normalized_user),
            size: attr_u64(group, "size"),
        })
        .collect()
}

pub fn extract_membership_requests(result: &BinaryNode) -> Vec<MembershipRequest> {
    let requests = get_binary_node_child(Some(result), "membership_approval_requests");
    get_binary_node_children(requests, "membership_approval_request")
        .into_iter()
        .map(|r| r.attrs.clone())
        .collect()
}

fn participant_status(p: &BinaryNode) -> String {
    p.get_attr("error").unwrap_or(SUCCESS_STATUS).to_string()
}

pub fn extract_request_action_results(
    result: &BinaryNode,
    action: MembershipRequestAction,
) -> Vec<ParticipantUpdate> {
    let node = get_binary_node_child(Some(result), "membership_requests_action");
    let node_action = get_binary_node_child(node, action.as_tag());
    get_binary_node_children(node_action, "participant")
        .into_iter()
        .map(|p| ParticipantUpdate {
            status: participant_status(p),
            jid: p.get_attr("jid").map(str::to_string),
            content: None,
        })
        .collect()
}

pub fn extract_participant_results(
    result: &BinaryNode,
    action: ParticipantAction,
) -> Vec<ParticipantUpdate> {
    let node = get_binary_node_child(Some(result), action.as_tag());
    get_binary_node_children(node, "participant")
        .into_iter()
        .map(|p| ParticipantUpdate {
            status: participant_status(p),
            jid: p.get_attr("jid").map(str::to_string),
            content: Some(p.clone()),
        })
        .collect()
}

pub fn extract_invite_code(result: &BinaryNode) -> Option<String> {
    get_binary_node_child(Some(result), "invite")
        .and_then(|i| i.get_attr("code"))
        .map(str::to_string)
}

/// Jid of the community joined through an invite code.
pub fn extract_accepted_community(result: &BinaryNode) -> Option<String> {
    get_binary_node_child(Some(result), "community")
        .and_then(|c| c.get_attr("jid"))
        .map(str::to_string)
}

/// Id of the group created by a create request, if the response has one.
pub fn extract_created_group_id(result: &BinaryNode) -> Option<String> {
    get_binary_node_child(Some(result), "group")
        .and_then(|g| g.get_attr("id"))
        .map(str::to_string)
}
