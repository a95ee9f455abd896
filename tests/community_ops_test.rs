//! Integration tests for the request/response community operations.

mod common;

use communities::binary::BinaryNode;
use communities::core::{
    CommunitySetting, CoreError, GroupMetadata, JoinApprovalMode, MemberAddMode,
    MembershipRequestAction, ParticipantAction,
};
use communities::ds::DeliveryServiceError;

use common::{harness, ok_result, result_with, MockServices, MockTransport};

fn first_child(node: &BinaryNode) -> &BinaryNode {
    &node.child_nodes()[0]
}

#[tokio::test]
async fn test_metadata_canonicalizes_id() {
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(
                BinaryNode::new("community")
                    .attr("id", "123")
                    .attr("subject", "Town")
                    .child(BinaryNode::new("ephemeral").attr("expiration", "3600")),
            ))
        }),
        MockServices::new(),
    );

    let meta = h.socket.metadata("123@g.us").await.unwrap();
    assert_eq!(meta.id, "123@g.us");
    assert_eq!(meta.subject, "Town");
    assert_eq!(meta.ephemeral_duration, Some(3600));

    let req = &h.transport.requests()[0];
    assert_eq!(req.get_attr("to"), Some("123@g.us"));
    assert_eq!(req.get_attr("type"), Some("get"));
    assert_eq!(first_child(req).get_attr("request"), Some("interactive"));
}

#[tokio::test]
async fn test_metadata_without_community_node_is_error() {
    let h = harness(MockTransport::new(), MockServices::new());
    let err = h.socket.metadata("1@g.us").await.unwrap_err();
    assert!(matches!(err, CoreError::MissingNode("community")));
}

#[tokio::test]
async fn test_transport_error_passes_through() {
    let h = harness(
        MockTransport::with_responder(|_| {
            Err(DeliveryServiceError::RemoteError {
                code: 403,
                text: "forbidden".to_string(),
            })
        }),
        MockServices::new(),
    );
    let err = h.socket.leave("1@g.us").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Delivery(DeliveryServiceError::RemoteError { code: 403, .. })
    ));
}

#[tokio::test]
async fn test_create_resolves_created_group() {
    let created = GroupMetadata {
        id: "999@g.us".to_string(),
        subject: "Neighbours".to_string(),
        is_community: true,
        ..Default::default()
    };
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(BinaryNode::new("group").attr("id", "999")))
        }),
        MockServices::new().with_group(created.clone()),
    );

    let meta = h.socket.create("Neighbours", Some("hi all")).await.unwrap();
    assert_eq!(meta, Some(created));

    let create = first_child(&h.transport.requests()[0]).clone();
    assert_eq!(create.tag, "create");
    let description = first_child(&create);
    assert_eq!(description.get_attr("id").map(str::len), Some(12));
    assert_eq!(
        first_child(description).content_string().as_deref(),
        Some("hi all")
    );
}

#[tokio::test]
async fn test_create_degrades_when_lookup_fails() {
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(BinaryNode::new("group").attr("id", "404")))
        }),
        MockServices::new(),
    );
    let meta = h.socket.create("Nobody", None).await.unwrap();
    assert!(meta.is_none());
}

#[tokio::test]
async fn test_create_group_links_parent() {
    let h = harness(MockTransport::new(), MockServices::new());
    let participants = vec!["1@s.whatsapp.net".to_string()];
    let meta = h
        .socket
        .create_group("Sub", &participants, "500@g.us")
        .await
        .unwrap();
    assert!(meta.is_none());

    let create = first_child(&h.transport.requests()[0]).clone();
    assert!(create.get_attr("key").unwrap().starts_with("3EB0"));
    let tags: Vec<&str> = create.child_nodes().iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, ["participant", "linked_parent"]);
    assert_eq!(create.child_nodes()[1].get_attr("jid"), Some("500@g.us"));
}

#[tokio::test]
async fn test_fetch_linked_groups_from_sub_group() {
    let sub = GroupMetadata {
        id: "77@g.us".to_string(),
        linked_parent: Some("500@g.us".to_string()),
        ..Default::default()
    };
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(BinaryNode::new("sub_groups").children(vec![
                BinaryNode::new("group").attr("id", "77").attr("subject", "Sub"),
                BinaryNode::new("group").attr("id", "78").attr("size", "3"),
            ])))
        }),
        MockServices::new().with_group(sub),
    );

    let linked = h.socket.fetch_linked_groups("77@g.us").await.unwrap();
    assert_eq!(linked.community_jid, "500@g.us");
    assert!(!linked.is_community);
    assert_eq!(linked.linked_groups.len(), 2);
    assert_eq!(linked.linked_groups[1].size, Some(3));
    assert_eq!(h.transport.requests()[0].get_attr("to"), Some("500@g.us"));
}

#[tokio::test]
async fn test_fetch_linked_groups_from_community() {
    let community = GroupMetadata {
        id: "500@g.us".to_string(),
        is_community: true,
        ..Default::default()
    };
    let h = harness(MockTransport::new(), MockServices::new().with_group(community));

    let linked = h.socket.fetch_linked_groups("500@g.us").await.unwrap();
    assert_eq!(linked.community_jid, "500@g.us");
    assert!(linked.is_community);
    assert!(linked.linked_groups.is_empty());
}

#[tokio::test]
async fn test_update_description_sends_prev() {
    let h = harness(
        MockTransport::with_responder(|req| match first_child(req).tag.as_str() {
            "query" => Ok(result_with(
                BinaryNode::new("community")
                    .attr("id", "5")
                    .child(BinaryNode::new("description").attr("id", "OLD")),
            )),
            _ => Ok(ok_result()),
        }),
        MockServices::new(),
    );

    h.socket
        .update_description("5@g.us", Some("new text"))
        .await
        .unwrap();
    assert_eq!(h.transport.request_tags(), ["query", "description"]);
    let requests = h.transport.requests();
    let description = first_child(&requests[1]);
    assert_eq!(description.get_attr("prev"), Some("OLD"));
    assert!(description.get_attr("id").is_some());

    h.socket.update_description("5@g.us", None).await.unwrap();
    let requests = h.transport.requests();
    assert_eq!(first_child(&requests[3]).get_attr("delete"), Some("true"));
}

#[tokio::test]
async fn test_participants_update_results() {
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(BinaryNode::new("remove").children(vec![
                BinaryNode::new("participant").attr("jid", "1@s.whatsapp.net"),
                BinaryNode::new("participant")
                    .attr("jid", "2@s.whatsapp.net")
                    .attr("error", "404"),
            ])))
        }),
        MockServices::new(),
    );
    let targets = vec!["1@s.whatsapp.net".to_string(), "2@s.whatsapp.net".to_string()];
    let results = h
        .socket
        .participants_update("5@g.us", &targets, ParticipantAction::Remove)
        .await
        .unwrap();

    let statuses: Vec<&str> = results.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, ["200", "404"]);
    assert_eq!(
        first_child(&h.transport.requests()[0]).get_attr("linked_groups"),
        Some("true")
    );
}

#[tokio::test]
async fn test_membership_requests() {
    let h = harness(
        MockTransport::with_responder(|req| match first_child(req).tag.as_str() {
            "membership_approval_requests" => Ok(result_with(
                BinaryNode::new("membership_approval_requests").child(
                    BinaryNode::new("membership_approval_request")
                        .attr("jid", "3@s.whatsapp.net")
                        .attr("request_time", "1700"),
                ),
            )),
            _ => Ok(result_with(BinaryNode::new("membership_requests_action").child(
                BinaryNode::new("approve")
                    .child(BinaryNode::new("participant").attr("jid", "3@s.whatsapp.net")),
            ))),
        }),
        MockServices::new(),
    );

    let pending = h.socket.request_participants_list("5@g.us").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].get("request_time").map(String::as_str), Some("1700"));

    let results = h
        .socket
        .request_participants_update(
            "5@g.us",
            &["3@s.whatsapp.net".to_string()],
            MembershipRequestAction::Approve,
        )
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, "200");
    assert!(results[0].content.is_none());

    // Reject finds nothing under an approve response.
    let rejected = h
        .socket
        .request_participants_update(
            "5@g.us",
            &["3@s.whatsapp.net".to_string()],
            MembershipRequestAction::Reject,
        )
        .await
        .unwrap();
    assert!(rejected.is_empty());
}

#[tokio::test]
async fn test_invite_codes() {
    let h = harness(
        MockTransport::with_responder(|req| {
            let invite = first_child(req);
            if invite.get_attr("code").is_some() {
                Ok(result_with(
                    BinaryNode::new("community").attr("jid", "600@g.us"),
                ))
            } else {
                Ok(result_with(BinaryNode::new("invite").attr("code", "XYZ")))
            }
        }),
        MockServices::new(),
    );

    assert_eq!(
        h.socket.invite_code("5@g.us").await.unwrap().as_deref(),
        Some("XYZ")
    );
    assert_eq!(
        h.socket.revoke_invite("5@g.us").await.unwrap().as_deref(),
        Some("XYZ")
    );
    assert_eq!(
        h.socket.accept_invite("XYZ").await.unwrap().as_deref(),
        Some("600@g.us")
    );
    assert!(h
        .socket
        .revoke_invite_v4("5@g.us", "8@s.whatsapp.net")
        .await
        .unwrap());

    let types: Vec<String> = h
        .transport
        .requests()
        .iter()
        .map(|r| r.get_attr("type").unwrap_or_default().to_string())
        .collect();
    assert_eq!(types, ["get", "set", "set", "set"]);
}

#[tokio::test]
async fn test_settings_requests() {
    let h = harness(MockTransport::new(), MockServices::new());
    h.socket.toggle_ephemeral("5@g.us", 0).await.unwrap();
    h.socket.toggle_ephemeral("5@g.us", 604800).await.unwrap();
    h.socket
        .setting_update("5@g.us", CommunitySetting::Locked)
        .await
        .unwrap();
    h.socket
        .member_add_mode("5@g.us", MemberAddMode::AllMemberAdd)
        .await
        .unwrap();
    h.socket
        .join_approval_mode("5@g.us", JoinApprovalMode::On)
        .await
        .unwrap();
    h.socket.update_subject("5@g.us", "Renamed").await.unwrap();
    h.socket.link_group("7@g.us", "5@g.us").await.unwrap();
    h.socket.unlink_group("7@g.us", "5@g.us").await.unwrap();

    assert_eq!(
        h.transport.request_tags(),
        [
            "not_ephemeral",
            "ephemeral",
            "locked",
            "member_add_mode",
            "membership_approval_mode",
            "subject",
            "links",
            "unlink"
        ]
    );
    let requests = h.transport.requests();
    assert_eq!(first_child(&requests[1]).get_attr("expiration"), Some("604800"));
    assert_eq!(
        first_child(&requests[3]).content_string().as_deref(),
        Some("all_member_add")
    );
    assert_eq!(
        first_child(first_child(&requests[4])).get_attr("state"),
        Some("on")
    );
    assert_eq!(
        first_child(&requests[5]).content_string().as_deref(),
        Some("Renamed")
    );
}

#[tokio::test]
async fn test_invite_info_previews_community() {
    let h = harness(
        MockTransport::with_responder(|_| {
            Ok(result_with(
                BinaryNode::new("community")
                    .attr("id", "321")
                    .attr("subject", "Preview")
                    .attr("creator", "4@c.us")
                    .child(BinaryNode::new("announcement")),
            ))
        }),
        MockServices::new(),
    );

    let meta = h.socket.invite_info("CODE").await.unwrap();
    assert_eq!(meta.id, "321@g.us");
    assert_eq!(meta.owner.as_deref(), Some("4@s.whatsapp.net"));
    assert!(meta.announce);

    let req = &h.transport.requests()[0];
    assert_eq!(req.get_attr("to"), Some("@g.us"));
    assert_eq!(req.get_attr("type"), Some("get"));
    assert_eq!(first_child(req).get_attr("code"), Some("CODE"));
}

#[tokio::test]
async fn test_fetch_all_participating_emits_update() {
    let h = harness(
        MockTransport::with_responder(|_| Ok(common::participating_response(&["10", "11"]))),
        MockServices::new(),
    );

    let all = h.socket.fetch_all_participating().await.unwrap();
    assert_eq!(all.keys().map(String::as_str).collect::<Vec<_>>(), ["10@g.us", "11@g.us"]);
    assert_eq!(h.handler.events().len(), 1);

    let participating = first_child(&h.transport.requests()[0]).clone();
    let tags: Vec<&str> = participating
        .child_nodes()
        .iter()
        .map(|c| c.tag.as_str())
        .collect();
    assert_eq!(tags, ["participants", "description"]);
}
