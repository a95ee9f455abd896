mod error;
mod stanza_filter;
mod transport;

pub use error::DeliveryServiceError;
pub use stanza_filter::{StanzaFilter, StanzaKey};
pub use transport::{build_iq, IqType, QueryTransport, COMMUNITY_XMLNS, DIRTY_XMLNS};
