use serde::Deserialize;
use std::path::PathBuf;

// Use the interfaces crate for core types
pub use interfaces::defs::{Category, PostExtras, Source, UnifiedPost};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; BlogDataGenerator/1.0)".to_string(),
            timeout_seconds: 10,
            max_retries: 1,
            retry_delay_seconds: 1,
        }
    }
}

/// Whether this run may reach out to external platforms at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Fast local iteration: external fetching is skipped.
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Production => "production",
        }
    }
}

/// A tag as delivered by a platform API: either a bare string or an object
/// with a `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
}

impl TagValue {
    pub fn name(&self) -> &str {
        match self {
            TagValue::Name(name) => name,
            TagValue::Object { name } => name.as_deref().unwrap_or(""),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("account \"{account}\" not found")]
    NotFound { account: String },

    #[error("rate limit exceeded (HTTP 429)")]
    RateLimited,

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }

    /// Worth another attempt: transport failures and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{path}: {reason}")]
    FrontMatter { path: PathBuf, reason: String },

    #[error("{path}: missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: {reason}")]
    UnknownCategory { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed parse error: {0}")]
    Feed(String),

    #[error("{provider} item skipped: {reason}")]
    Item { provider: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
