use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{Brawler, Friend, FriendshipStatus, Page, PageQuery};
use crate::cache::ResultCache;
use crate::error::Result;
use crate::signal::Signal;
use crate::transport::{ApiRequest, ApiTransport};

const FRIENDS_NS: &str = "friends";
const REQUESTS_NS: &str = "requests";
const MEMBERS_NS: &str = "members";

/// Owns the friendship views and drives the friend-request state machine:
/// `none --request--> pending --accept--> accepted`, with reject and remove
/// returning the pair to `none`. One mutation changes the membership of
/// both derived lists, so accept refreshes both.
pub struct FriendshipCoordinator {
    api: Arc<dyn ApiTransport>,
    cache: Arc<ResultCache>,
    friends: Signal<Vec<Friend>>,
    pending_requests: Signal<Vec<Friend>>,
    is_loading_friends: Signal<bool>,
}

impl FriendshipCoordinator {
    pub fn new(api: Arc<dyn ApiTransport>, cache: Arc<ResultCache>) -> Self {
        Self {
            api,
            cache,
            friends: Signal::default(),
            pending_requests: Signal::default(),
            is_loading_friends: Signal::default(),
        }
    }

    pub fn friends(&self) -> &Signal<Vec<Friend>> {
        &self.friends
    }

    pub fn pending_requests(&self) -> &Signal<Vec<Friend>> {
        &self.pending_requests
    }

    pub fn is_loading_friends(&self) -> &Signal<bool> {
        &self.is_loading_friends
    }

    pub fn is_friend(&self, brawler_id: i32) -> bool {
        self.friends.get().iter().any(|f| f.friend_id == brawler_id)
    }

    pub async fn load_friends(&self) -> Result<()> {
        self.is_loading_friends.set(true);
        let result = self
            .cached_get::<Vec<Friend>>("list", FRIENDS_NS, "/api/social/friends")
            .await;
        self.is_loading_friends.set(false);

        self.friends.set(result?);
        Ok(())
    }

    pub async fn load_pending_requests(&self) -> Result<()> {
        let requests = self
            .cached_get::<Vec<Friend>>("list", REQUESTS_NS, "/api/social/friends/requests")
            .await?;
        self.pending_requests.set(requests);
        Ok(())
    }

    /// Bypasses the cache; used after mutations and by the reconciler.
    pub async fn refresh_friends(&self) -> Result<()> {
        self.cache.clear(FRIENDS_NS);
        self.load_friends().await
    }

    /// Bypasses the cache; used after mutations and by the reconciler.
    pub async fn refresh_pending_requests(&self) -> Result<()> {
        self.cache.clear(REQUESTS_NS);
        self.load_pending_requests().await
    }

    /// Sends a friend request. The server rejects duplicates (a pending or
    /// accepted record already exists for the pair); that rejection is
    /// surfaced to the caller, never assumed away.
    pub async fn request_friend(&self, target_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::post(format!(
                "/api/social/friends/add/{}",
                target_id
            )))
            .await?;
        Ok(())
    }

    /// Valid only with a pending record where the caller is the recipient.
    pub async fn accept_friend(&self, friend_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::post(format!(
                "/api/social/friends/accept/{}",
                friend_id
            )))
            .await?;
        self.refresh_friends().await?;
        self.refresh_pending_requests().await?;
        Ok(())
    }

    /// Valid only with a pending record where the caller is the recipient.
    pub async fn reject_friend(&self, friend_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!(
                "/api/social/friends/reject/{}",
                friend_id
            )))
            .await?;
        self.refresh_pending_requests().await?;
        Ok(())
    }

    /// Valid only from `accepted`; either side may remove.
    pub async fn remove_friend(&self, friend_id: i32) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!(
                "/api/social/friends/remove/{}",
                friend_id
            )))
            .await?;
        self.refresh_friends().await?;
        Ok(())
    }

    pub async fn friendship_status(&self, other_id: i32) -> Result<FriendshipStatus> {
        let value = self
            .api
            .request(ApiRequest::get(format!("/api/social/status/{}", other_id)))
            .await?;
        decode(value)
    }

    /// Paged brawler directory search, served through the `members` cache
    /// namespace with avatar normalization on store.
    pub async fn search_brawlers(&self, page: &PageQuery) -> Result<Page<Brawler>> {
        let key = ResultCache::create_key(page);
        if let Some(cached) = self.cache.load(&key, MEMBERS_NS) {
            debug!(key, "brawler search served from cache");
            return decode(cached);
        }

        let value = self
            .api
            .request(ApiRequest::get("/api/brawlers/search").with_query(page.to_query()))
            .await?;
        decode(self.cache.save(&key, MEMBERS_NS, value))
    }

    async fn cached_get<T: DeserializeOwned>(
        &self,
        key: &str,
        namespace: &str,
        path: &str,
    ) -> Result<T> {
        if let Some(cached) = self.cache.load(key, namespace) {
            debug!(namespace, "list served from cache");
            return decode(cached);
        }
        let value = self.api.request(ApiRequest::get(path)).await?;
        decode(self.cache.save(key, namespace, value))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(Into::into)
}
