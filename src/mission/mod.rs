//! Mission lifecycle coordination.
//!
//! Core mission domain:
//! - `MissionStatus`: lifecycle state machine
//! - `Mission`, `MissionFilter`, `CrewMember`: wire models and queries
//! - `MissionCoordinator`: view state, crew operations, lifecycle guards

mod coordinator;
mod status;
mod types;

pub use coordinator::MissionCoordinator;
pub use status::MissionStatus;
pub use types::{AddMission, CrewMember, EditMission, Mission, MissionFilter};
