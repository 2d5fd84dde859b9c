#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crewlink::{
    ApiFailure, ApiRequest, ApiTransport, CoordConfig, FriendshipCoordinator,
    InvitationCoordinator, ManualClock, Method, MissionCoordinator, Notice, NoticeSink, Passport,
    PushSubscription, PushTransport, ResultCache, SessionHandle,
};

pub type Handler = dyn Fn(&ApiRequest) -> Result<Value, ApiFailure> + Send + Sync;

/// Scriptable in-memory API transport; records every request it serves.
pub struct FakeApi {
    handler: Mutex<Arc<Handler>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<Value, ApiFailure> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Mutex::new(Arc::new(handler)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_handler(
        &self,
        handler: impl Fn(&ApiRequest) -> Result<Value, ApiFailure> + Send + Sync + 'static,
    ) {
        *self.handler.lock() = Arc::new(handler);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ApiTransport for FakeApi {
    async fn request(&self, req: ApiRequest) -> Result<Value, ApiFailure> {
        let handler = self.handler.lock().clone();
        self.calls.lock().push(req.clone());
        handler(&req)
    }
}

/// Push transport handing out in-memory subscriptions.
pub struct FakePush {
    senders: Mutex<Vec<mpsc::Sender<String>>>,
    opened: AtomicUsize,
}

impl FakePush {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            senders: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
        })
    }

    /// Delivers a raw frame to every live subscription.
    pub async fn send(&self, frame: &str) {
        let senders: Vec<_> = self.senders.lock().clone();
        for tx in senders {
            let _ = tx.send(frame.to_string()).await;
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn live_connections(&self) -> usize {
        self.senders.lock().iter().filter(|tx| !tx.is_closed()).count()
    }
}

#[async_trait]
impl PushTransport for FakePush {
    async fn open(&self, _token: &str) -> Result<PushSubscription, ApiFailure> {
        let (tx, rx) = mpsc::channel(32);
        self.senders.lock().push(tx);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(PushSubscription::new(rx))
    }
}

/// Notice sink that keeps everything it is handed.
#[derive(Default)]
pub struct CollectingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.notices
            .lock()
            .iter()
            .any(|n| n.message.contains(fragment))
    }
}

impl NoticeSink for CollectingNotices {
    fn publish(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Fully wired coordinator stack over the fakes.
pub struct TestWorld {
    pub api: Arc<FakeApi>,
    pub push: Arc<FakePush>,
    pub session: SessionHandle,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<ResultCache>,
    pub missions: Arc<MissionCoordinator>,
    pub friends: Arc<FriendshipCoordinator>,
    pub invitations: Arc<InvitationCoordinator>,
    pub notices: Arc<CollectingNotices>,
}

impl TestWorld {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<Value, ApiFailure> + Send + Sync + 'static,
    ) -> Self {
        let config = CoordConfig::default();
        let api = FakeApi::new(handler);
        let push = FakePush::new();
        let session = SessionHandle::new();
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(ResultCache::new(config.cache.ttl(), clock.clone()));
        let missions = Arc::new(MissionCoordinator::new(
            api.clone(),
            cache.clone(),
            session.clone(),
        ));
        let friends = Arc::new(FriendshipCoordinator::new(api.clone(), cache.clone()));
        let invitations = Arc::new(InvitationCoordinator::new(
            api.clone(),
            cache.clone(),
            clock.clone(),
            config.invitations.cooldown(),
            missions.clone(),
        ));
        let notices = CollectingNotices::new();

        Self {
            api,
            push,
            session,
            clock,
            cache,
            missions,
            friends,
            invitations,
            notices,
        }
    }

    pub fn login(&self, id: i32) {
        self.session.login(passport(id));
    }

    pub fn spawn_reconciler(&self) -> tokio::task::JoinHandle<()> {
        crewlink::EventReconciler::new(
            self.session.clone(),
            self.push.clone(),
            self.friends.clone(),
            self.invitations.clone(),
            self.missions.clone(),
            self.notices.clone(),
        )
        .spawn()
    }
}

pub fn passport(id: i32) -> Passport {
    Passport {
        id,
        username: format!("brawler-{}", id),
        display_name: format!("Brawler {}", id),
        access_token: format!("token-{}", id),
    }
}

pub fn mission_json(
    id: i32,
    name: &str,
    status: &str,
    chief_id: i32,
    crew_count: i64,
    max_participants: i32,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "status": status,
        "chief_id": chief_id,
        "chief_name": format!("Brawler {}", chief_id),
        "crew_count": crew_count,
        "image_url": null,
        "code": format!("M{:04}", id),
        "max_participants": max_participants,
        "created_at": "2026-08-01T12:00:00Z",
        "updated_at": "2026-08-01T12:00:00Z",
    })
}

pub fn friend_json(friendship_id: i32, friend_id: i32, status: &str) -> Value {
    json!({
        "friendship_id": friendship_id,
        "friend_id": friend_id,
        "display_name": format!("Brawler {}", friend_id),
        "username": format!("brawler-{}", friend_id),
        "avatar_url": null,
        "status": status,
    })
}

pub fn invitation_json(invitation_id: i32, mission_id: i32, inviter_id: i32, invitee_id: i32) -> Value {
    json!({
        "invitation_id": invitation_id,
        "mission_id": mission_id,
        "mission_name": format!("Mission {}", mission_id),
        "inviter_id": inviter_id,
        "inviter_name": format!("Brawler {}", inviter_id),
        "invitee_id": invitee_id,
        "invitee_name": format!("Brawler {}", invitee_id),
        "status": "pending",
        "created_at": "2026-08-01T12:00:00Z",
    })
}

/// Routes nothing special: empty lists everywhere, no current mission.
pub fn empty_world(req: &ApiRequest) -> Result<Value, ApiFailure> {
    match (req.method, req.path.as_str()) {
        (Method::Get, "/api/view/gets") => Ok(json!([])),
        (Method::Get, "/api/crew/current") => Ok(json!({"mission_id": null})),
        (Method::Get, "/api/social/friends") => Ok(json!([])),
        (Method::Get, "/api/social/friends/requests") => Ok(json!([])),
        (Method::Get, "/api/social/invitations") => Ok(json!([])),
        _ => Err(ApiFailure::new(
            404,
            format!("no fake route for {} {}", req.method, req.path),
        )),
    }
}

/// Polls `cond` until it holds or a short deadline passes.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}
