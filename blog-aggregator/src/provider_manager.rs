use crate::config::GeneratorConfig;
use crate::fetcher::Fetcher;
use crate::sources::{NoteProvider, QiitaProvider, ZennProvider};
use crate::traits::PullFeed;
use crate::types::{FetchConfig, Result, RunMode, Source, UnifiedPost};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Owns one provider per external platform and fans fetches out across them.
pub struct ProviderManager {
    providers: Vec<Arc<dyn PullFeed>>,
    external_enabled: bool,
    mode: RunMode,
}

impl ProviderManager {
    pub fn new(config: &GeneratorConfig, mode: RunMode, fetch_config: FetchConfig) -> Result<Self> {
        let fetcher = Fetcher::new(fetch_config)?;

        let providers: Vec<Arc<dyn PullFeed>> = vec![
            Arc::new(ZennProvider::new(config.provider_config(Source::Zenn), fetcher.clone())),
            Arc::new(NoteProvider::new(config.provider_config(Source::Note), fetcher.clone())),
            Arc::new(QiitaProvider::new(config.provider_config(Source::Qiita), fetcher)),
        ];

        let manager = Self::with_providers(providers, config.external_fetch_enabled, mode);
        manager.log_provider_status();
        Ok(manager)
    }

    pub fn with_providers(providers: Vec<Arc<dyn PullFeed>>, external_enabled: bool, mode: RunMode) -> Self {
        Self {
            providers,
            external_enabled,
            mode,
        }
    }

    pub fn add_provider(&mut self, provider: Arc<dyn PullFeed>) {
        self.providers.push(provider);
    }

    /// False when the environment switched external articles off or the run
    /// is in development mode.
    pub fn fetching_allowed(&self) -> bool {
        self.external_enabled && self.mode != RunMode::Development
    }

    pub fn providers(&self) -> &[Arc<dyn PullFeed>] {
        &self.providers
    }

    pub fn enabled_providers(&self) -> Vec<Arc<dyn PullFeed>> {
        self.providers
            .iter()
            .filter(|p| p.enabled())
            .cloned()
            .collect()
    }

    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn PullFeed>> {
        self.providers
            .iter()
            .find(|p| p.provider_name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn log_provider_status(&self) {
        info!(
            mode = self.mode.as_str(),
            external_enabled = self.external_enabled,
            "External article providers:"
        );
        for provider in &self.providers {
            if provider.enabled() {
                info!("  {}: enabled ({})", provider.provider_name(), provider.account());
            } else if provider.account().trim().is_empty() {
                info!("  {}: disabled (account not configured)", provider.provider_name());
            } else {
                info!("  {}: disabled (environment disabled)", provider.provider_name());
            }
        }
    }

    /// Articles from every enabled provider, fetched concurrently. A provider
    /// that fails only loses its own share.
    pub async fn fetch_all_articles(&self) -> Vec<UnifiedPost> {
        if !self.fetching_allowed() {
            info!(mode = self.mode.as_str(), "Skipping external articles");
            return Vec::new();
        }

        let enabled = self.enabled_providers();
        if enabled.is_empty() {
            warn!("No external article providers enabled");
            return Vec::new();
        }

        info!("Fetching articles from {} external provider(s)", enabled.len());

        let handles: Vec<_> = enabled
            .into_iter()
            .map(|provider| {
                let name = provider.provider_name();
                (name, tokio::spawn(async move { provider.pull().await }))
            })
            .collect();

        let mut articles = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(posts) => articles.extend(posts),
                Err(e) => error!(provider = name, error = %e, "Provider task failed"),
            }
        }

        info!("External articles fetched: {} total", articles.len());
        for (source, count) in count_by_source(&articles) {
            info!("  {}: {} articles", source, count);
        }

        articles
    }
}

pub fn count_by_source(posts: &[UnifiedPost]) -> BTreeMap<Source, usize> {
    let mut stats = BTreeMap::new();
    for post in posts {
        *stats.entry(post.source).or_insert(0) += 1;
    }
    stats
}
