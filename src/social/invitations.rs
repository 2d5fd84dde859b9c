use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::MissionInvitation;
use crate::cache::ResultCache;
use crate::clock::Clock;
use crate::error::{CoordError, Result};
use crate::mission::MissionCoordinator;
use crate::signal::Signal;
use crate::transport::{ApiRequest, ApiTransport};

const CACHE_NS: &str = "invitations";

/// Owns mission-invitation state and the anti-spam throttle.
///
/// The cooldown is tracked per invitee regardless of mission, lives only in
/// memory, and rejects a re-invite locally before any remote call.
pub struct InvitationCoordinator {
    api: Arc<dyn ApiTransport>,
    cache: Arc<ResultCache>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
    last_invite: Mutex<HashMap<i32, Instant>>,
    missions: Arc<MissionCoordinator>,
    invitations: Signal<Vec<MissionInvitation>>,
    is_loading_invitations: Signal<bool>,
}

impl InvitationCoordinator {
    pub fn new(
        api: Arc<dyn ApiTransport>,
        cache: Arc<ResultCache>,
        clock: Arc<dyn Clock>,
        cooldown: Duration,
        missions: Arc<MissionCoordinator>,
    ) -> Self {
        Self {
            api,
            cache,
            clock,
            cooldown,
            last_invite: Mutex::new(HashMap::new()),
            missions,
            invitations: Signal::default(),
            is_loading_invitations: Signal::default(),
        }
    }

    pub fn invitations(&self) -> &Signal<Vec<MissionInvitation>> {
        &self.invitations
    }

    pub fn is_loading_invitations(&self) -> &Signal<bool> {
        &self.is_loading_invitations
    }

    /// Remaining cooldown before `invitee_id` may be invited again.
    pub fn cooldown_remaining(&self, invitee_id: i32) -> Option<Duration> {
        let last = *self.last_invite.lock().get(&invitee_id)?;
        let elapsed = self.clock.now().duration_since(last);
        if elapsed < self.cooldown {
            Some(self.cooldown - elapsed)
        } else {
            None
        }
    }

    /// Invites a friend to a mission. Throttled per invitee: a second
    /// invite inside the cooldown window is rejected locally even for a
    /// different mission.
    pub async fn invite(&self, invitee_id: i32, mission_id: i32) -> Result<i32> {
        if let Some(remaining) = self.cooldown_remaining(invitee_id) {
            let secs = remaining.as_secs_f64().ceil() as u64;
            return Err(CoordError::validation(format!(
                "Please wait {}s before re-inviting.",
                secs
            )));
        }

        let value = self
            .api
            .request(ApiRequest::post(format!(
                "/api/social/invite/{}/{}",
                invitee_id, mission_id
            )))
            .await?;
        let invitation_id: i32 = decode(value)?;

        self.last_invite.lock().insert(invitee_id, self.clock.now());
        self.cache.clear(CACHE_NS);
        Ok(invitation_id)
    }

    /// Responds to an invitation addressed to the caller. Accepting is
    /// equivalent to a join, so the mission views and the current-mission
    /// pointer are refreshed as well; rejecting only refreshes the
    /// invitation list. A second response to the same invitation is a
    /// server-side error and is surfaced, not swallowed.
    ///
    /// The server may answer with a bare OK; the mission id is returned
    /// only when the response body carries one.
    pub async fn respond(&self, invitation_id: i32, accept: bool) -> Result<Option<i32>> {
        let value = self
            .api
            .request(
                ApiRequest::post(format!(
                    "/api/social/invitations/respond/{}",
                    invitation_id
                ))
                .with_body(json!({ "accept": accept })),
            )
            .await?;
        let mission_id = decode::<Option<RespondOutcome>>(value)?.map(|o| o.mission_id);

        self.refresh_invitations().await?;
        if accept {
            self.missions.refresh_all().await;
        }
        Ok(mission_id)
    }

    pub async fn load_invitations(&self) -> Result<()> {
        self.is_loading_invitations.set(true);
        let result = self
            .cached_get::<Vec<MissionInvitation>>("mine", "/api/social/invitations")
            .await;
        self.is_loading_invitations.set(false);

        self.invitations.set(result?);
        Ok(())
    }

    /// Bypasses the cache; used after mutations and by the reconciler.
    pub async fn refresh_invitations(&self) -> Result<()> {
        self.cache.clear(CACHE_NS);
        self.load_invitations().await
    }

    /// Pending invitations for one mission, for the crew panel.
    pub async fn load_mission_invitations(
        &self,
        mission_id: i32,
    ) -> Result<Vec<MissionInvitation>> {
        let key = format!("mission_{}", mission_id);
        self.cached_get(
            &key,
            &format!("/api/social/mission/{}/invitations", mission_id),
        )
        .await
    }

    async fn cached_get<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T> {
        if let Some(cached) = self.cache.load(key, CACHE_NS) {
            debug!(key, "invitations served from cache");
            return decode(cached);
        }
        let value = self.api.request(ApiRequest::get(path)).await?;
        decode(self.cache.save(key, CACHE_NS, value))
    }
}

#[derive(serde::Deserialize)]
struct RespondOutcome {
    mission_id: i32,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(Into::into)
}
