use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Identity of the signed-in brawler, as issued by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub access_token: String,
}

/// Shared accessor for the current session.
///
/// Either "authenticated with a passport" or "unauthenticated". Every
/// transition of this value drives the event reconciler's channel
/// lifecycle; nothing else opens or closes the push subscription.
#[derive(Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Option<Passport>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(None)),
        }
    }

    pub fn login(&self, passport: Passport) {
        self.tx.send_replace(Some(passport));
    }

    pub fn logout(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<Passport> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Passport>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
