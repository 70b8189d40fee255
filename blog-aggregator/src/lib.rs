pub mod types;
pub mod config;
pub mod cache;
pub mod categorize;
pub mod utils;
pub mod fetcher;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod provider_manager;
pub mod content;
pub mod aggregator;

pub use types::*;
pub use config::{GeneratorConfig, ProviderConfig};
pub use cache::ArticleCache;
pub use fetcher::Fetcher;
pub use parser::{FeedItem, FeedParser};
pub use traits::{ArticleProvider, PullFeed};
pub use sources::{NoteProvider, QiitaProvider, ZennProvider};
pub use provider_manager::ProviderManager;
pub use content::ContentReader;
pub use aggregator::{BlogAggregator, GenerationReport, OutputConfig, OutputLayout};
