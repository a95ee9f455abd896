/// Errors originating from the socket/transport layer.
///
/// String payloads carry the remote or transport message. Callers should
/// treat them as opaque diagnostic text, not match on their content.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryServiceError {
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Remote returned error {code}: {text}")]
    RemoteError { code: u16, text: String },
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("An unknown error occurred: {0}")]
    Other(anyhow::Error),
}
