use crate::cache::ArticleCache;
use crate::categorize::{infer_category, KeywordSet};
use crate::config::ProviderConfig;
use crate::fetcher::Fetcher;
use crate::parser::decode_items;
use crate::traits::ArticleProvider;
use crate::types::{FetchError, PostExtras, Source, TagValue, UnifiedPost};
use crate::utils::text::{strip_markdown, truncate_excerpt};
use crate::utils::time::normalize_date;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const QIITA_API_URL: &str = "https://qiita.com/api/v2";
const PER_PAGE: &str = "20";

const KEYWORDS: KeywordSet = KeywordSet {
    life: &[
        "ポエム", "キャリア", "転職", "働き方", "雑記", "ライフハック", "日記", "エッセイ",
        "思考", "チームビルディング", "マネジメント", "リーダーシップ", "career", "poem",
        "essay", "management", "leadership",
    ],
    tech: &[
        "javascript", "typescript", "react", "nextjs", "vue", "angular", "node", "nodejs",
        "python", "java", "go", "rust", "php", "ruby", "frontend", "backend", "fullstack",
        "api", "database", "sql", "aws", "gcp", "azure", "docker", "kubernetes", "github",
        "git", "cicd", "devops", "terraform", "programming", "development", "tech",
        "engineering", "html", "css", "sass", "webpack", "vite", "mysql", "postgresql",
        "mongodb", "redis", "linux", "ubuntu", "centos", "nginx", "apache",
    ],
};

/// An entry of `GET /api/v2/users/:user_id/items`.
#[derive(Debug, Clone, Deserialize)]
pub struct QiitaItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagValue>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub stocks_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub private: bool,
}

/// Qiita items through API v2, with engagement counters.
pub struct QiitaProvider {
    config: ProviderConfig,
    cache: ArticleCache,
    fetcher: Fetcher,
    api_url: String,
}

impl QiitaProvider {
    pub fn new(config: ProviderConfig, fetcher: Fetcher) -> Self {
        Self::with_api_url(config, fetcher, QIITA_API_URL)
    }

    pub fn with_api_url(config: ProviderConfig, fetcher: Fetcher, api_url: impl Into<String>) -> Self {
        let cache = ArticleCache::from_hours(config.cache_duration_hours);
        Self {
            config,
            cache,
            fetcher,
            api_url: api_url.into(),
        }
    }

    /// `<api>/users/<id>/items?page=1&per_page=20`
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["users", self.config.username.as_str(), "items"]);
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("per_page", PER_PAGE);
        Ok(url)
    }

    fn excerpt(item: &QiitaItem) -> String {
        let plain = item.body.as_deref().map(strip_markdown).unwrap_or_default();
        if plain.is_empty() {
            truncate_excerpt(&item.title)
        } else {
            truncate_excerpt(&plain)
        }
    }
}

#[async_trait]
impl ArticleProvider for QiitaProvider {
    type Raw = QiitaItem;

    fn name(&self) -> &'static str {
        "Qiita"
    }

    fn source(&self) -> Source {
        Source::Qiita
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    async fn fetch_articles(&self) -> Result<Vec<QiitaItem>, FetchError> {
        let url = self.endpoint()?;
        let payload: serde_json::Value = self.fetcher.get_json(&url, &self.config.username).await?;
        match payload {
            serde_json::Value::Array(values) => Ok(decode_items(self.name(), values)),
            other => {
                warn!(provider = self.name(), kind = %json_kind(&other), "Expected an array of items");
                Ok(Vec::new())
            }
        }
    }

    fn transform_article(&self, item: QiitaItem) -> UnifiedPost {
        let tags: Vec<String> = item
            .tags
            .iter()
            .map(|t| t.name().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        UnifiedPost {
            slug: format!("{}-{}", Source::Qiita, item.id),
            date: normalize_date(item.created_at.as_deref()),
            category: infer_category(&tags, &KEYWORDS),
            excerpt: Self::excerpt(&item),
            content: None,
            source: Source::Qiita,
            extras: PostExtras {
                likes: Some(item.likes_count),
                stocks: Some(item.stocks_count),
                comments: Some(item.comments_count),
                private: Some(item.private),
                ..PostExtras::default()
            },
            title: item.title,
            url: item.url,
            tags,
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
