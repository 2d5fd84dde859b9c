//! Transport seams consumed by the coordinators.
//!
//! - `ApiTransport`: synchronous request/response calls to the server
//! - `PushTransport`: long-lived server-push subscription of raw JSON frames
//!
//! Concrete HTTP/SSE implementations live outside this crate; tests drive
//! the coordinators through in-memory fakes.

mod api;
mod push;

pub use api::{ApiFailure, ApiRequest, ApiTransport, Method};
pub use push::{PushSubscription, PushTransport};
