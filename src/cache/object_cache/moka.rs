use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// 每个条目按写入时指定的 TTL 过期
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _now: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

pub struct MokaCacheWrapper {
    inner: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MokaCacheWrapper {
    pub fn new(max_capacity: u64, default_ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}",
            max_capacity
        );
        Self {
            inner,
            default_ttl: Duration::from_secs(default_ttl_secs),
        }
    }

    pub fn from_config() -> Self {
        let config = AppConfig::get();
        Self::new(config.cache.memory.max_capacity, config.cache.default_ttl)
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(entry) => CacheResult::Found(entry.value),
            None => {
                debug!("Key not found in cache: {}", key);
                CacheResult::NotFound
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let ttl = if ttl == 0 {
            self.default_ttl
        } else {
            Duration::from_secs(ttl)
        };
        self.inner.insert(key, Entry { value, ttl }).await;
    }

    async fn remove(&self, key: &str) -> Option<String> {
        self.inner.remove(key).await.map(|entry| entry.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaCacheWrapper::new(100, 60));
        cache.insert("state:abc".to_string(), &true, 600).await;
        assert_eq!(cache.get::<bool>("state:abc").await, CacheResult::Found(true));

        assert_eq!(cache.remove("state:abc").await.as_deref(), Some("true"));
        assert_eq!(cache.remove("state:abc").await, None);
        assert_eq!(cache.get::<bool>("state:abc").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_undecodable_value() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaCacheWrapper::new(100, 60));
        cache
            .insert_raw("k".to_string(), "not json".to_string(), 0)
            .await;
        assert_eq!(cache.get::<i64>("k").await, CacheResult::ExistsButNoValue);
    }
}
