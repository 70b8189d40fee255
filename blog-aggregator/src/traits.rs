use crate::cache::ArticleCache;
use crate::config::ProviderConfig;
use crate::types::{FetchError, Source, UnifiedPost};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// One external publishing platform: how to fetch its articles and how to
/// turn each one into a [`UnifiedPost`].
#[async_trait]
pub trait ArticleProvider: Send + Sync {
    /// The platform's native article shape.
    type Raw: Send;

    /// Human-readable name, used in logs.
    fn name(&self) -> &'static str;

    fn source(&self) -> Source;

    fn config(&self) -> &ProviderConfig;

    fn cache(&self) -> &ArticleCache;

    fn is_enabled(&self) -> bool {
        self.config().is_enabled()
    }

    /// Retrieve raw articles from the platform.
    async fn fetch_articles(&self) -> Result<Vec<Self::Raw>, FetchError>;

    /// Map one raw article into the unified schema. Must not fail.
    fn transform_article(&self, raw: Self::Raw) -> UnifiedPost;

    /// Fetch, transform and cache. Never fails: a disabled provider or a
    /// failed fetch contributes an empty list.
    async fn get_articles(&self) -> Vec<UnifiedPost> {
        if !self.is_enabled() {
            info!(provider = self.name(), "Disabled or not configured");
            return Vec::new();
        }

        let config = self.config();
        let cache_key = config.cache_key();

        if config.use_cache {
            if let Some(cached) = self.cache().get(&cache_key).await {
                info!(provider = self.name(), count = cached.len(), "Using cached articles");
                return cached;
            }
        }

        info!(provider = self.name(), account = %config.username, "Fetching articles");

        let raw = match self.fetch_articles().await {
            Ok(raw) => raw,
            Err(e) => {
                report_fetch_error(self.name(), &e);
                return Vec::new();
            }
        };

        let mut posts: Vec<UnifiedPost> = raw
            .into_iter()
            .map(|article| self.transform_article(article))
            .collect();
        ensure_unique_slugs(&mut posts);

        if config.use_cache {
            self.cache().insert(cache_key, posts.clone()).await;
        }

        info!(provider = self.name(), count = posts.len(), "Fetched articles");
        posts
    }
}

/// Object-safe view of a provider, so the manager can hold every platform in
/// one list.
#[async_trait]
pub trait PullFeed: Send + Sync {
    fn provider_name(&self) -> &'static str;

    fn source_tag(&self) -> Source;

    fn account(&self) -> &str;

    fn enabled(&self) -> bool;

    async fn pull(&self) -> Vec<UnifiedPost>;
}

#[async_trait]
impl<P: ArticleProvider> PullFeed for P {
    fn provider_name(&self) -> &'static str {
        ArticleProvider::name(self)
    }

    fn source_tag(&self) -> Source {
        ArticleProvider::source(self)
    }

    fn account(&self) -> &str {
        &ArticleProvider::config(self).username
    }

    fn enabled(&self) -> bool {
        ArticleProvider::is_enabled(self)
    }

    async fn pull(&self) -> Vec<UnifiedPost> {
        ArticleProvider::get_articles(self).await
    }
}

fn report_fetch_error(provider: &'static str, e: &FetchError) {
    error!(provider, error = %e, "Provider fetch failed");
    if e.is_rate_limited() {
        warn!(provider, "Rate limit detected, skipping this fetch");
    }
}

/// Make slugs unique within one batch by suffixing repeats with `-2`, `-3`, ...
pub fn ensure_unique_slugs(posts: &mut [UnifiedPost]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for post in posts.iter_mut() {
        let count = seen.entry(post.slug.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            let mut n = *count;
            let mut candidate = format!("{}-{}", post.slug, n);
            while seen.contains_key(&candidate) {
                n += 1;
                candidate = format!("{}-{}", post.slug, n);
            }
            seen.insert(candidate.clone(), 1);
            post.slug = candidate;
        }
    }
}
