//! crewlink: client-side coordination engine for cooperative missions.
//!
//! Owns the mission lifecycle state machine, crew membership and invitation
//! rules, the friendship state machine, a TTL-bounded result cache, and the
//! event reconciler that keeps locally held views converged with the server
//! over a push channel. The presentation layer, token storage, and the
//! concrete HTTP/SSE transports are external collaborators reached through
//! the traits in `transport` and `session`.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod mission;
pub mod notice;
pub mod reconciler;
pub mod session;
pub mod signal;
pub mod social;
pub mod transport;

pub use cache::ResultCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoordConfig;
pub use error::{CoordError, Result};
pub use mission::{Mission, MissionCoordinator, MissionStatus};
pub use notice::{LogNoticeSink, Notice, NoticeLevel, NoticeSink};
pub use reconciler::{EventReconciler, ServerEvent};
pub use session::{Passport, SessionHandle};
pub use signal::Signal;
pub use social::{FriendshipCoordinator, InvitationCoordinator};
pub use transport::{ApiFailure, ApiRequest, ApiTransport, Method, PushSubscription, PushTransport};
