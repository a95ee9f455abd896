//! Shared mocks for the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use communities::binary::BinaryNode;
use communities::core::{
    CommunityEventHandler, CommunitySocket, Contact, CoreError, GroupMetadata, MessageUpdate,
    SocketServices, UpsertKind, WebMessageInfo,
};
use communities::ds::{DeliveryServiceError, QueryTransport};

// ─────────────────────────── Mock Transport ───────────────────────────

type Responder =
    Box<dyn Fn(&BinaryNode) -> Result<BinaryNode, DeliveryServiceError> + Send + Sync>;

pub struct MockTransport {
    requests: Mutex<Vec<BinaryNode>>,
    responder: Responder,
    inbound: broadcast::Sender<BinaryNode>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub fn ok_result() -> BinaryNode {
    BinaryNode::new("iq").attr("type", "result")
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(ok_result()))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&BinaryNode) -> Result<BinaryNode, DeliveryServiceError> + Send + Sync + 'static,
    {
        let (inbound, _) = broadcast::channel(16);
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            inbound,
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<BinaryNode> {
        self.requests.lock().unwrap().clone()
    }

    /// Tag of the first child of every request sent so far.
    pub fn request_tags(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.child_nodes().first().map(|c| c.tag.clone()).unwrap_or_default())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn push(&self, node: BinaryNode) {
        self.inbound.send(node).unwrap();
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, DeliveryServiceError> {
        self.requests.lock().unwrap().push(node.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.responder)(&node)
    }

    fn subscribe(&self) -> broadcast::Receiver<BinaryNode> {
        self.inbound.subscribe()
    }
}

// ─────────────────────────── Mock Services ───────────────────────────

#[derive(Default)]
pub struct MockServices {
    pub metadata: Mutex<HashMap<String, GroupMetadata>>,
    pub upserts: Mutex<Vec<(WebMessageInfo, UpsertKind)>>,
    pub me: Option<Contact>,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            me: Some(Contact {
                id: "100:2@s.whatsapp.net".to_string(),
                name: Some("Me".to_string()),
                lid: None,
            }),
            ..Default::default()
        }
    }

    pub fn with_group(self, metadata: GroupMetadata) -> Self {
        self.metadata
            .lock()
            .unwrap()
            .insert(metadata.id.clone(), metadata);
        self
    }

    pub fn upserts(&self) -> Vec<(WebMessageInfo, UpsertKind)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocketServices for MockServices {
    async fn group_metadata(&self, jid: &str) -> Result<GroupMetadata, CoreError> {
        self.metadata
            .lock()
            .unwrap()
            .get(jid)
            .cloned()
            .ok_or_else(|| CoreError::HandlerError(format!("item-not-found: {jid}")))
    }

    async fn upsert_message(
        &self,
        msg: WebMessageInfo,
        kind: UpsertKind,
    ) -> Result<(), CoreError> {
        self.upserts.lock().unwrap().push((msg, kind));
        Ok(())
    }

    fn me(&self) -> Option<Contact> {
        self.me.clone()
    }
}

// ─────────────────────────── Mock Handler ───────────────────────────

#[derive(Debug, Clone)]
pub enum Event {
    GroupsUpdate(Vec<GroupMetadata>),
    MessagesUpdate(Vec<MessageUpdate>),
}

#[derive(Clone, Default)]
pub struct MockHandler {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MockHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommunityEventHandler for MockHandler {
    async fn on_groups_update(&self, groups: Vec<GroupMetadata>) {
        self.events.lock().unwrap().push(Event::GroupsUpdate(groups));
    }

    async fn on_messages_update(&self, updates: Vec<MessageUpdate>) {
        self.events
            .lock()
            .unwrap()
            .push(Event::MessagesUpdate(updates));
    }
}

// ─────────────────────────── Helpers ───────────────────────────

pub type TestSocket = CommunitySocket<MockTransport, MockServices, MockHandler>;

pub struct Harness {
    pub socket: Arc<TestSocket>,
    pub transport: Arc<MockTransport>,
    pub services: Arc<MockServices>,
    pub handler: Arc<MockHandler>,
}

pub fn harness(transport: MockTransport, services: MockServices) -> Harness {
    communities::init_logging();
    let transport = Arc::new(transport);
    let services = Arc::new(services);
    let handler = Arc::new(MockHandler::new());
    let socket = Arc::new(CommunitySocket::new(
        transport.clone(),
        services.clone(),
        handler.clone(),
    ));
    Harness {
        socket,
        transport,
        services,
        handler,
    }
}

/// Response wrapping a single child.
pub fn result_with(child: BinaryNode) -> BinaryNode {
    ok_result().child(child)
}

pub fn participating_response(ids: &[&str]) -> BinaryNode {
    result_with(
        BinaryNode::new("communities").children(
            ids.iter()
                .map(|id| {
                    BinaryNode::new("community")
                        .attr("id", *id)
                        .attr("subject", format!("Community {id}"))
                        .child(BinaryNode::new("parent"))
                })
                .collect(),
        ),
    )
}

pub fn dirty_push(category: &str) -> BinaryNode {
    BinaryNode::new("ib").child(
        BinaryNode::new("dirty")
            .attr("type", category)
            .attr("timestamp", "1700000000"),
    )
}
