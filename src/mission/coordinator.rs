use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{AddMission, CrewMember, EditMission, Mission, MissionFilter, MissionStatus};
use crate::cache::ResultCache;
use crate::error::{CoordError, Result};
use crate::session::{Passport, SessionHandle};
use crate::signal::Signal;
use crate::transport::{ApiRequest, ApiTransport};

const CACHE_NS: &str = "missions";

/// Owns mission and crew view state.
///
/// Four disjoint views are kept: Explore (others', Open), My Missions (own,
/// Open + InProgress), Joined (member but not chief, Open + InProgress) and
/// Finished (participant, Completed + Failed). Every refresh is a full
/// re-fetch and replace, so overlapping refreshes stay last-write-wins safe.
pub struct MissionCoordinator {
    api: Arc<dyn ApiTransport>,
    cache: Arc<ResultCache>,
    session: SessionHandle,
    explore: Signal<Vec<Mission>>,
    mine: Signal<Vec<Mission>>,
    joined: Signal<Vec<Mission>>,
    finished: Signal<Vec<Mission>>,
    current_mission_id: Signal<Option<i32>>,
    is_loading: Signal<bool>,
    is_loading_mine: Signal<bool>,
    is_loading_finished: Signal<bool>,
}

impl MissionCoordinator {
    pub fn new(api: Arc<dyn ApiTransport>, cache: Arc<ResultCache>, session: SessionHandle) -> Self {
        Self {
            api,
            cache,
            session,
            explore: Signal::default(),
            mine: Signal::default(),
            joined: Signal::default(),
            finished: Signal::default(),
            current_mission_id: Signal::default(),
            is_loading: Signal::default(),
            is_loading_mine: Signal::default(),
            is_loading_finished: Signal::default(),
        }
    }

    pub fn explore(&self) -> &Signal<Vec<Mission>> {
        &self.explore
    }

    pub fn mine(&self) -> &Signal<Vec<Mission>> {
        &self.mine
    }

    pub fn joined(&self) -> &Signal<Vec<Mission>> {
        &self.joined
    }

    pub fn finished(&self) -> &Signal<Vec<Mission>> {
        &self.finished
    }

    pub fn current_mission_id(&self) -> &Signal<Option<i32>> {
        &self.current_mission_id
    }

    pub fn is_loading(&self) -> &Signal<bool> {
        &self.is_loading
    }

    pub fn is_loading_mine(&self) -> &Signal<bool> {
        &self.is_loading_mine
    }

    pub fn is_loading_finished(&self) -> &Signal<bool> {
        &self.is_loading_finished
    }

    /// Missions open to the caller: not their own, not already joined,
    /// optionally narrowed by share code.
    pub async fn load_explore(&self, code: Option<&str>) -> Result<()> {
        let passport = self.require_session()?;
        let filter = MissionFilter {
            status: Some(MissionStatus::Open),
            exclude_chief_id: Some(passport.id),
            exclude_member_id: Some(passport.id),
            code: code.map(str::to_string),
            ..Default::default()
        };

        self.is_loading.set(true);
        let result = self.query_missions(&filter).await;
        self.is_loading.set(false);

        self.explore.set(result?);
        Ok(())
    }

    /// Missions the caller leads, Open and InProgress merged newest-first.
    pub async fn load_mine(&self) -> Result<()> {
        let passport = self.require_session()?;

        self.is_loading_mine.set(true);
        let result = self
            .load_two_statuses(
                MissionFilter {
                    chief_id: Some(passport.id),
                    ..Default::default()
                },
                MissionStatus::Open,
                MissionStatus::InProgress,
            )
            .await;
        self.is_loading_mine.set(false);

        self.mine.set(result?);
        Ok(())
    }

    /// Missions the caller crews for someone else, Open and InProgress.
    pub async fn load_joined(&self) -> Result<()> {
        let passport = self.require_session()?;
        let missions = self
            .load_two_statuses(
                MissionFilter {
                    member_id: Some(passport.id),
                    exclude_chief_id: Some(passport.id),
                    ..Default::default()
                },
                MissionStatus::Open,
                MissionStatus::InProgress,
            )
            .await?;
        self.joined.set(missions);
        Ok(())
    }

    /// Concluded missions the caller took part in, as chief or crew.
    pub async fn load_finished(&self) -> Result<()> {
        let passport = self.require_session()?;

        self.is_loading_finished.set(true);
        let result = self
            .load_two_statuses(
                MissionFilter {
                    member_id: Some(passport.id),
                    ..Default::default()
                },
                MissionStatus::Completed,
                MissionStatus::Failed,
            )
            .await;
        self.is_loading_finished.set(false);

        self.finished.set(result?);
        Ok(())
    }

    pub async fn mission(&self, mission_id: i32) -> Result<Mission> {
        let value = self
            .api
            .request(ApiRequest::get(format!("/api/view/{}", mission_id)))
            .await?;
        decode(value)
    }

    pub async fn crew_members(&self, mission_id: i32) -> Result<Vec<CrewMember>> {
        let value = self
            .api
            .request(ApiRequest::get(format!("/api/crew/members/{}", mission_id)))
            .await?;
        decode(value)
    }

    /// Re-derives the current-mission pointer from the server. Never
    /// inferred from local join/leave calls alone, because a server-side
    /// removal (being kicked) must clear it too.
    pub async fn refresh_current_mission(&self) -> Result<()> {
        let value = self
            .api
            .request(ApiRequest::get("/api/crew/current"))
            .await?;
        let current = decode::<CurrentMission>(value)?.mission_id;
        self.current_mission_id.set(current);
        Ok(())
    }

    pub async fn create(&self, mission: AddMission) -> Result<i32> {
        let body = serde_json::to_value(&mission)?;
        let value = self
            .api
            .request(ApiRequest::post("/api/mission-management/").with_body(body))
            .await?;
        let id = decode::<CreatedMission>(value)?.mission_id;

        self.cache.clear(CACHE_NS);
        self.log_refresh_error(self.load_mine().await, "my missions");
        Ok(id)
    }

    pub async fn edit(&self, mission_id: i32, changes: EditMission) -> Result<()> {
        let body = serde_json::to_value(&changes)?;
        self.api
            .request(
                ApiRequest::patch(format!("/api/mission-management/{}", mission_id))
                    .with_body(body),
            )
            .await?;

        self.cache.clear(CACHE_NS);
        self.log_refresh_error(self.load_mine().await, "my missions");
        Ok(())
    }

    pub async fn delete(&self, mission_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!(
                "/api/mission-management/{}",
                mission_id
            )))
            .await?;

        self.cache.clear(CACHE_NS);
        self.log_refresh_error(self.load_mine().await, "my missions");
        self.log_refresh_error(self.refresh_current_mission().await, "current mission");
        Ok(())
    }

    /// Joins a mission as crew. Rejected locally when the caller already
    /// holds a mission or the target is at capacity; the server stays the
    /// final arbiter for capacity races.
    pub async fn join(&self, mission: &Mission) -> Result<()> {
        self.require_session()?;

        if let Some(current) = self.current_mission_id.get() {
            if current == mission.id {
                return Err(CoordError::validation("You are already in this mission"));
            }
            return Err(CoordError::validation(
                "You are already in another mission. Leave it first before joining a new one.",
            ));
        }
        if mission.is_full() {
            return Err(CoordError::validation(format!(
                "Mission '{}' is full",
                mission.name
            )));
        }

        self.api
            .request(ApiRequest::post(format!("/api/crew/join/{}", mission.id)))
            .await?;

        self.cache.clear(CACHE_NS);
        self.log_refresh_error(self.load_explore(None).await, "explore");
        self.log_refresh_error(self.refresh_current_mission().await, "current mission");
        Ok(())
    }

    /// Unconditional request; server failures are surfaced verbatim.
    pub async fn leave(&self, mission_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!("/api/crew/leave/{}", mission_id)))
            .await?;
        self.refresh_all().await;
        Ok(())
    }

    /// Unconditional request; server failures are surfaced verbatim.
    pub async fn kick(&self, mission_id: i32, brawler_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!(
                "/api/crew/kick/{}/{}",
                mission_id, brawler_id
            )))
            .await?;
        self.cache.clear(CACHE_NS);
        Ok(())
    }

    /// Open -> InProgress, chief only.
    pub async fn start(&self, mission: &Mission) -> Result<()> {
        self.transition(mission, MissionStatus::InProgress, "in-progress", "start")
            .await
    }

    /// InProgress -> Completed, chief only.
    pub async fn complete(&self, mission: &Mission) -> Result<()> {
        self.transition(mission, MissionStatus::Completed, "to-completed", "complete")
            .await
    }

    /// InProgress -> Failed, chief only.
    pub async fn fail(&self, mission: &Mission) -> Result<()> {
        self.transition(mission, MissionStatus::Failed, "to-failed", "fail")
            .await
    }

    /// Entry point for the event reconciler: drop cached mission results and
    /// re-fetch every view plus the current-mission pointer. Individual
    /// failures are logged and leave that view stale until the next cycle.
    pub async fn refresh_all(&self) {
        if self.session.current().is_none() {
            debug!("skipping mission refresh without a session");
            return;
        }
        self.cache.clear(CACHE_NS);
        self.log_refresh_error(self.load_explore(None).await, "explore");
        self.log_refresh_error(self.load_mine().await, "my missions");
        self.log_refresh_error(self.load_joined().await, "joined");
        self.log_refresh_error(self.load_finished().await, "finished");
        self.log_refresh_error(self.refresh_current_mission().await, "current mission");
    }

    async fn transition(
        &self,
        mission: &Mission,
        target: MissionStatus,
        operation: &str,
        verb: &str,
    ) -> Result<()> {
        let passport = self.require_session()?;
        if mission.chief_id != passport.id {
            return Err(CoordError::validation(format!(
                "Only the chief can {} mission '{}'",
                verb, mission.name
            )));
        }
        if !mission.status.can_transition_to(target) {
            return Err(CoordError::validation(format!(
                "Mission '{}' cannot go from {} to {}",
                mission.name, mission.status, target
            )));
        }

        self.api
            .request(ApiRequest::post(format!(
                "/api/mission-operation/{}/{}",
                operation, mission.id
            )))
            .await?;

        self.refresh_all().await;
        Ok(())
    }

    async fn load_two_statuses(
        &self,
        base: MissionFilter,
        first: MissionStatus,
        second: MissionStatus,
    ) -> Result<Vec<Mission>> {
        let mut filter = base.clone();
        filter.status = Some(first);
        let mut missions = self.query_missions(&filter).await?;

        filter = base;
        filter.status = Some(second);
        missions.extend(self.query_missions(&filter).await?);

        // Stable sort by descending id keeps newest-first ordering
        // deterministic across the two separate queries.
        missions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(missions)
    }

    async fn query_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>> {
        let key = ResultCache::create_key(filter);
        if let Some(cached) = self.cache.load(&key, CACHE_NS) {
            debug!(key, "mission view served from cache");
            return decode(cached);
        }

        let value = self
            .api
            .request(ApiRequest::get("/api/view/gets").with_query(filter.to_query()))
            .await?;
        decode(self.cache.save(&key, CACHE_NS, value))
    }

    fn require_session(&self) -> Result<Passport> {
        self.session.current().ok_or(CoordError::NoSession)
    }

    fn log_refresh_error(&self, result: Result<()>, view: &str) {
        if let Err(e) = result {
            warn!(view, error = %e, "view refresh failed; staying stale this cycle");
        }
    }
}

#[derive(serde::Deserialize)]
struct CreatedMission {
    mission_id: i32,
}

/// `{"mission_id": <id|null>}` as the crew endpoint reports it.
#[derive(serde::Deserialize)]
struct CurrentMission {
    mission_id: Option<i32>,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(Into::into)
}
