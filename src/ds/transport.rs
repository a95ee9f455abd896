//! Transport-agnostic query interface.
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::binary::BinaryNode;
use crate::ds::DeliveryServiceError;

/// Namespace of every community query.
pub const COMMUNITY_XMLNS: &str = "w:g2";
/// Namespace of the dirty-bit acknowledgment.
pub const DIRTY_XMLNS: &str = "urn:xmpp:whatsapp:dirty";

/// Direction of an IQ request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IqType {
    Get,
    Set,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
        }
    }
}

/// Wrap children into an `iq` request addressed to `to`.
pub fn build_iq(to: &str, iq_type: IqType, xmlns: &str, content: Vec<BinaryNode>) -> BinaryNode {
    BinaryNode::new("iq")
        .attr("type", iq_type.as_str())
        .attr("xmlns", xmlns)
        .attr("to", to)
        .children(content)
}

/// The socket the community layer runs on.
///
/// `query` is a single request/response round trip: at-most-once delivery,
/// errors reported by the remote side come back as `Err`. Timeouts are the
/// implementation's responsibility.
#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    /// Send a request and wait for its response.
    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, DeliveryServiceError>;

    /// Subscribe to out-of-band stanzas pushed by the server.
    ///
    /// Each call returns a new receiver; lagging receivers lose the oldest
    /// stanzas.
    fn subscribe(&self) -> broadcast::Receiver<BinaryNode>;
}
