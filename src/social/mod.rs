//! Friendship and invitation coordination.
//!
//! - `FriendshipCoordinator`: friend-request state machine and lookups
//! - `InvitationCoordinator`: mission invitations with per-invitee throttle
//! - Wire models for friends, invitations, and the brawler directory

mod friends;
mod invitations;
mod types;

pub use friends::FriendshipCoordinator;
pub use invitations::InvitationCoordinator;
pub use types::{
    Brawler, Friend, FriendshipState, FriendshipStatus, InvitationState, MissionInvitation, Page,
    PageInfo, PageQuery,
};
