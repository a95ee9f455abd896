//! Community management core.
//!
//! Request builders ([`requests`]) and response extractors ([`extract`]) are
//! pure; [`CommunitySocket`] ties them to a transport, the collaborating
//! socket subsystems, and an event handler.

mod api;
mod error;
mod events;
pub mod extract;
mod provider;
pub mod requests;
mod types;

pub use api::{CommunitySocket, INVITE_JOIN_STUB_TYPE};
pub use error::CoreError;
pub use events::CommunityEventHandler;
pub use provider::SocketServices;
pub use types::{
    CommunitySetting, Contact, GroupInviteMessage, GroupMetadata, GroupParticipant,
    InviteOrigin, JoinApprovalMode, LinkedGroup, LinkedGroups, MemberAddMode, MembershipRequest,
    MembershipRequestAction, MessageKey, MessageUpdate, ParticipantAction, ParticipantRole,
    ParticipantUpdate, UpsertKind, WebMessageInfo,
};
