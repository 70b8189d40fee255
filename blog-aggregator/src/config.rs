use crate::types::Source;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const ENV_ENABLE_EXTERNAL: &str = "ENABLE_EXTERNAL_ARTICLES";
pub const ENV_USE_CACHE: &str = "CACHE_EXTERNAL_ARTICLES";
pub const ENV_CACHE_HOURS: &str = "CACHE_DURATION_HOURS";
pub const ENV_ZENN_USERNAME: &str = "ZENN_USERNAME";
pub const ENV_NOTE_USERNAME: &str = "NOTE_USERNAME";
pub const ENV_QIITA_USER_ID: &str = "QIITA_USER_ID";

pub const DEFAULT_CACHE_HOURS: u64 = 24;

/// Everything a generation run reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub external_fetch_enabled: bool,
    pub use_cache: bool,
    pub cache_duration_hours: u64,
    pub accounts: HashMap<Source, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            external_fetch_enabled: true,
            use_cache: true,
            cache_duration_hours: DEFAULT_CACHE_HOURS,
            accounts: HashMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load `.env`-style overrides from `env_file` when it exists, then read
    /// the process environment.
    pub fn load(env_file: &Path) -> Self {
        if env_file.exists() {
            match dotenvy::from_path(env_file) {
                Ok(()) => debug!(path = %env_file.display(), "loaded environment file"),
                Err(e) => warn!(path = %env_file.display(), error = %e, "failed to load environment file"),
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Toggles are on unless spelled exactly "false".
        let flag = |key: &str| lookup(key).as_deref() != Some("false");

        let cache_duration_hours = match lookup(ENV_CACHE_HOURS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    warn!(value = %raw, "{} is not a positive integer, using {}", ENV_CACHE_HOURS, DEFAULT_CACHE_HOURS);
                    DEFAULT_CACHE_HOURS
                }
            },
            None => DEFAULT_CACHE_HOURS,
        };

        let mut accounts = HashMap::new();
        for (source, key) in [
            (Source::Zenn, ENV_ZENN_USERNAME),
            (Source::Note, ENV_NOTE_USERNAME),
            (Source::Qiita, ENV_QIITA_USER_ID),
        ] {
            if let Some(account) = lookup(key) {
                let account = account.trim().to_string();
                if !account.is_empty() {
                    accounts.insert(source, account);
                }
            }
        }

        Self {
            external_fetch_enabled: flag(ENV_ENABLE_EXTERNAL),
            use_cache: flag(ENV_USE_CACHE),
            cache_duration_hours,
            accounts,
        }
    }

    pub fn account(&self, source: Source) -> &str {
        self.accounts.get(&source).map(String::as_str).unwrap_or("")
    }

    /// Common cache settings merged with one provider's switch and account.
    pub fn provider_config(&self, source: Source) -> ProviderConfig {
        let username = self.account(source).to_string();
        ProviderConfig {
            enabled: self.external_fetch_enabled && !username.is_empty(),
            username,
            use_cache: self.use_cache,
            cache_duration_hours: self.cache_duration_hours,
        }
    }
}

/// Settings handed to a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub username: String,
    pub use_cache: bool,
    pub cache_duration_hours: u64,
}

impl ProviderConfig {
    /// Switched on and pointing at an account. A provider switched on without
    /// an account is treated as off.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.username.trim().is_empty()
    }

    pub fn cache_key(&self) -> String {
        format!("articles_{}", self.username)
    }
}
