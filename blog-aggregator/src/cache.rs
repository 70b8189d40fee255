use crate::types::UnifiedPost;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CacheEntry {
    posts: Vec<UnifiedPost>,
    expires_at: Instant,
}

/// Transformed articles kept for the lifetime of one provider instance.
pub struct ArticleCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ArticleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(3600)))
    }

    /// Returns the cached posts for `key`, evicting the entry when expired.
    pub async fn get(&self, key: &str) -> Option<Vec<UnifiedPost>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Some(entry.posts.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        debug!(key, "cache entry expired");
        self.entries.write().await.remove(key);
        None
    }

    pub async fn insert(&self, key: impl Into<String>, posts: Vec<UnifiedPost>) {
        let entry = CacheEntry {
            posts,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_entries() {
        let cache = ArticleCache::from_hours(24);
        cache.insert("articles_me", Vec::new()).await;
        assert_eq!(cache.get("articles_me").await, Some(Vec::new()));
        assert_eq!(cache.get("articles_other").await, None);
    }

    #[tokio::test]
    async fn zero_ttl_expires_and_evicts() {
        let cache = ArticleCache::new(Duration::ZERO);
        cache.insert("articles_me", Vec::new()).await;
        assert_eq!(cache.get("articles_me").await, None);
        assert!(cache.is_empty().await);
    }
}
