use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::clock::Clock;

/// Hook applied to a value before it is stored. Must be idempotent; it is a
/// data-shaping step (e.g. filling a default avatar), not a correctness one.
pub type Normalizer = dyn Fn(&str, Value) -> Value + Send + Sync;

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Namespaced, TTL-bounded memoization of query results.
///
/// Keys are composed as `namespace + key`, so `clear("members")` evicts
/// only member results while leaving other namespaces intact. Entries older
/// than the TTL are treated as absent and evicted on access.
pub struct ResultCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: DashMap<String, CacheEntry>,
    normalizer: Option<Box<Normalizer>>,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: DashMap::new(),
            normalizer: None,
        }
    }

    pub fn with_normalizer(
        mut self,
        normalizer: impl Fn(&str, Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    /// Stores `value` under `(namespace, key)` and returns the (possibly
    /// normalized) stored value.
    pub fn save(&self, key: &str, namespace: &str, value: Value) -> Value {
        let value = match &self.normalizer {
            Some(normalize) => normalize(namespace, value),
            None => value,
        };
        self.entries.insert(
            Self::compose(namespace, key),
            CacheEntry {
                value: value.clone(),
                stored_at: self.clock.now(),
            },
        );
        value
    }

    /// Returns the cached value, or `None` if absent or past its TTL.
    /// An expired entry is removed on the way out.
    pub fn load(&self, key: &str, namespace: &str) -> Option<Value> {
        let composed = Self::compose(namespace, key);
        let expired = match self.entries.get(&composed) {
            Some(entry) => {
                if self.clock.now().duration_since(entry.stored_at) > self.ttl {
                    true
                } else {
                    return Some(entry.value.clone());
                }
            }
            None => return None,
        };
        if expired {
            self.entries.remove(&composed);
        }
        None
    }

    /// Evicts every entry whose composed key starts with `prefix`;
    /// an empty prefix evicts everything.
    pub fn clear(&self, prefix: &str) {
        debug!(prefix, "clearing result cache");
        if prefix.is_empty() {
            self.entries.clear();
        } else {
            self.entries.retain(|key, _| !key.starts_with(prefix));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derives a cache key by joining the query's values in fixed
    /// (alphabetical) field order.
    ///
    /// Hazard kept as observed: two distinct query shapes that render to the
    /// same joined string collide, so callers must key a namespace on one
    /// fixed, known field set.
    pub fn create_key<T: Serialize>(query: &T) -> String {
        match serde_json::to_value(query) {
            Ok(Value::Object(map)) => map
                .values()
                .map(Self::key_fragment)
                .collect::<Vec<_>>()
                .join("_"),
            Ok(other) => Self::key_fragment(&other),
            Err(_) => String::new(),
        }
    }

    fn key_fragment(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn compose(namespace: &str, key: &str) -> String {
        format!("{}{}", namespace, key)
    }
}

/// Normalizer that fills a missing `avatar_url` on each record of a paged
/// `items` array with the given fallback. Applied to member-search results;
/// other namespaces pass through untouched.
pub fn default_avatar_normalizer(
    fallback: impl Into<String>,
) -> impl Fn(&str, Value) -> Value + Send + Sync {
    let fallback = fallback.into();
    move |namespace: &str, mut value: Value| {
        if namespace != "members" {
            return value;
        }
        if let Some(items) = value.get_mut("items").and_then(Value::as_array_mut) {
            for item in items {
                if let Some(obj) = item.as_object_mut() {
                    let missing = obj.get("avatar_url").is_none_or(Value::is_null);
                    if missing {
                        obj.insert("avatar_url".into(), Value::String(fallback.clone()));
                    }
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_clock() -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResultCache::new(Duration::from_secs(300), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (cache, _clock) = cache_with_clock();
        cache.save("1_10", "members", json!({"items": []}));
        assert_eq!(cache.load("1_10", "members"), Some(json!({"items": []})));
    }

    #[test]
    fn test_ttl_eviction() {
        let (cache, clock) = cache_with_clock();
        cache.save("k", "members", json!(1));

        clock.advance(Duration::from_secs(299));
        assert!(cache.load("k", "members").is_some());

        clock.advance(Duration::from_secs(2));
        assert!(cache.load("k", "members").is_none());
        assert!(cache.is_empty(), "expired entry should be removed");
    }

    #[test]
    fn test_clear_by_prefix() {
        let (cache, _clock) = cache_with_clock();
        cache.save("a", "members", json!(1));
        cache.save("b", "members", json!(2));
        cache.save("a", "chat", json!(3));

        cache.clear("members");
        assert!(cache.load("a", "members").is_none());
        assert!(cache.load("b", "members").is_none());
        assert_eq!(cache.load("a", "chat"), Some(json!(3)));
    }

    #[test]
    fn test_clear_all() {
        let (cache, _clock) = cache_with_clock();
        cache.save("a", "members", json!(1));
        cache.save("a", "chat", json!(2));
        cache.clear("");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_refreshes_value() {
        let (cache, _clock) = cache_with_clock();
        cache.save("k", "missions", json!(1));
        cache.save("k", "missions", json!(2));
        assert_eq!(cache.load("k", "missions"), Some(json!(2)));
    }

    #[test]
    fn test_create_key_joins_values_in_field_order() {
        #[derive(Serialize)]
        struct Query {
            current_page: u32,
            page_size: u32,
            query: Option<String>,
        }

        let key = ResultCache::create_key(&Query {
            current_page: 1,
            page_size: 10,
            query: Some("ana".into()),
        });
        assert_eq!(key, "1_10_ana");

        let key = ResultCache::create_key(&Query {
            current_page: 1,
            page_size: 10,
            query: None,
        });
        assert_eq!(key, "1_10_");
    }

    #[test]
    fn test_normalizer_is_applied_and_idempotent() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResultCache::new(Duration::from_secs(300), clock)
            .with_normalizer(default_avatar_normalizer("/assets/default.png"));

        let value = json!({"items": [{"username": "ana", "avatar_url": null}]});
        let stored = cache.save("k", "members", value);
        assert_eq!(stored["items"][0]["avatar_url"], "/assets/default.png");

        // Re-saving the normalized value changes nothing.
        let again = cache.save("k", "members", stored.clone());
        assert_eq!(again, stored);
    }

    #[test]
    fn test_normalizer_skips_other_namespaces() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResultCache::new(Duration::from_secs(300), clock)
            .with_normalizer(default_avatar_normalizer("/assets/default.png"));

        let value = json!({"items": [{"avatar_url": null}]});
        let stored = cache.save("k", "chat", value.clone());
        assert_eq!(stored, value);
    }
}
