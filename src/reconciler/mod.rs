//! Event-driven reconciliation.
//!
//! Subscribes to the server-push channel whenever a session token is held,
//! decodes typed events, and triggers targeted re-fetches so every locally
//! held view converges with the server regardless of which client caused
//! the change.

mod events;

pub use events::ServerEvent;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::mission::MissionCoordinator;
use crate::notice::{Notice, NoticeSink};
use crate::session::SessionHandle;
use crate::social::{FriendshipCoordinator, InvitationCoordinator};
use crate::transport::PushTransport;

/// Bridges the push channel to the coordinators.
///
/// The subscription's lifecycle is strictly derived from session state: a
/// token appearing opens the channel (closing any previous one) and the
/// token clearing closes it. A malformed frame is logged and dropped
/// without touching the channel; transport-level reconnection is the
/// transport's responsibility.
pub struct EventReconciler {
    session: SessionHandle,
    push: Arc<dyn PushTransport>,
    dispatcher: Arc<Dispatcher>,
}

impl EventReconciler {
    pub fn new(
        session: SessionHandle,
        push: Arc<dyn PushTransport>,
        friends: Arc<FriendshipCoordinator>,
        invitations: Arc<InvitationCoordinator>,
        missions: Arc<MissionCoordinator>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher {
            session: session.clone(),
            friends,
            invitations,
            missions,
            notices,
        });
        Self {
            session,
            push,
            dispatcher,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let mut session_rx = self.session.subscribe();
        let mut reader: Option<JoinHandle<()>> = None;

        loop {
            let token = session_rx
                .borrow_and_update()
                .as_ref()
                .map(|p| p.access_token.clone());

            if let Some(handle) = reader.take() {
                debug!("closing push subscription");
                handle.abort();
            }

            if let Some(token) = token {
                match self.push.open(&token).await {
                    Ok(mut subscription) => {
                        debug!("push subscription opened");
                        let dispatcher = Arc::clone(&self.dispatcher);
                        reader = Some(tokio::spawn(async move {
                            while let Some(frame) = subscription.recv().await {
                                match serde_json::from_str::<ServerEvent>(&frame) {
                                    Ok(event) => dispatcher.dispatch(event).await,
                                    Err(e) => {
                                        warn!(error = %e, "dropping malformed push frame")
                                    }
                                }
                            }
                            debug!("push stream ended");
                        }));
                    }
                    Err(e) => warn!(error = %e, "failed to open push subscription"),
                }
            }

            if session_rx.changed().await.is_err() {
                break;
            }
        }

        if let Some(handle) = reader.take() {
            handle.abort();
        }
    }
}

struct Dispatcher {
    session: SessionHandle,
    friends: Arc<FriendshipCoordinator>,
    invitations: Arc<InvitationCoordinator>,
    missions: Arc<MissionCoordinator>,
    notices: Arc<dyn NoticeSink>,
}

impl Dispatcher {
    async fn dispatch(&self, event: ServerEvent) {
        debug!(?event, "push event received");
        match event {
            ServerEvent::FriendRequest { .. } => {
                self.notices
                    .publish(Notice::info("New friend request received!"));
                log_refresh(self.friends.refresh_pending_requests().await);
            }
            ServerEvent::FriendAccepted { .. } => {
                self.notices
                    .publish(Notice::success("Friend request accepted!"));
                log_refresh(self.friends.refresh_friends().await);
            }
            ServerEvent::MissionInvitation { .. } => {
                self.notices
                    .publish(Notice::info("You have been invited to a mission!"));
                log_refresh(self.invitations.refresh_invitations().await);
            }
            ServerEvent::MissionDeleted { .. } => {
                self.notices.publish(Notice::info(
                    "The mission has been terminated by the chief.",
                ));
                self.refresh_mission_views().await;
            }
            ServerEvent::MissionCreated { .. }
            | ServerEvent::MissionUpdated { .. }
            | ServerEvent::MissionStatusChanged { .. }
            | ServerEvent::MissionJoined { .. }
            | ServerEvent::MissionInvitationAccepted { .. } => {
                self.refresh_mission_views().await;
            }
            ServerEvent::MissionLeft { brawler_id, .. } => {
                let me = self.session.current().map(|p| p.id);
                if me == Some(brawler_id) {
                    self.notices.publish(Notice::warning(
                        "You have been removed from the mission deployment.",
                    ));
                }
                self.refresh_mission_views().await;
            }
            ServerEvent::Unknown => {
                debug!("ignoring unknown push event type");
            }
        }
    }

    /// Mission-affecting events also shift friends' availability, so the
    /// social lists are pulled alongside the mission views.
    async fn refresh_mission_views(&self) {
        self.missions.refresh_all().await;
        log_refresh(self.friends.refresh_friends().await);
        log_refresh(self.friends.refresh_pending_requests().await);
        log_refresh(self.invitations.refresh_invitations().await);
    }
}

fn log_refresh(result: crate::error::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "refresh failed; view stays stale this cycle");
    }
}
