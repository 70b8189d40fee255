use crate::cache::ArticleCache;
use crate::categorize::{infer_category, KeywordSet};
use crate::config::ProviderConfig;
use crate::fetcher::Fetcher;
use crate::parser::decode_items;
use crate::traits::ArticleProvider;
use crate::types::{FetchError, PostExtras, Source, TagValue, UnifiedPost};
use crate::utils::text::truncate_excerpt;
use crate::utils::time::normalize_date;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

pub const ZENN_API_URL: &str = "https://zenn.dev/api/articles";
pub const ZENN_SITE_URL: &str = "https://zenn.dev";

const DEFAULT_EMOJI: &str = "📝";
/// Articles with a body longer than this get a shortened title in the excerpt.
const LONG_BODY_LETTERS: u64 = 200;
const SHORT_TITLE_CHARS: usize = 150;

const KEYWORDS: KeywordSet = KeywordSet {
    life: &[
        "career", "キャリア", "転職", "poem", "ポエム", "essay", "エッセイ", "diary", "日記",
        "雑記", "lifehack", "ライフハック",
    ],
    tech: &[
        "javascript", "typescript", "react", "nextjs", "vue", "angular", "node", "python",
        "java", "go", "rust", "php", "ruby", "frontend", "backend", "fullstack", "api",
        "database", "aws", "gcp", "azure", "docker", "kubernetes", "github", "git", "cicd",
        "devops", "terraform", "programming", "development", "tech", "engineering",
    ],
};

/// An entry of `GET /api/articles?username=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct ZennArticle {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body_letters_count: u64,
    #[serde(default)]
    pub liked_count: u64,
    #[serde(default)]
    pub topics: Vec<TagValue>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ZennResponse {
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

/// Zenn articles through the public articles API.
pub struct ZennProvider {
    config: ProviderConfig,
    cache: ArticleCache,
    fetcher: Fetcher,
    api_url: String,
    site_url: String,
}

impl ZennProvider {
    pub fn new(config: ProviderConfig, fetcher: Fetcher) -> Self {
        Self::with_endpoints(config, fetcher, ZENN_API_URL, ZENN_SITE_URL)
    }

    pub fn with_endpoints(
        config: ProviderConfig,
        fetcher: Fetcher,
        api_url: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        let cache = ArticleCache::from_hours(config.cache_duration_hours);
        Self {
            config,
            cache,
            fetcher,
            api_url: api_url.into(),
            site_url: site_url.into(),
        }
    }

    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.api_url,
            &[("username", self.config.username.as_str()), ("order", "latest")],
        )
    }

    pub fn article_url(&self, slug: &str) -> String {
        format!(
            "{}/{}/articles/{}",
            self.site_url.trim_end_matches('/'),
            self.config.username,
            slug
        )
    }

    fn excerpt(article: &ZennArticle) -> String {
        let emoji = article
            .emoji
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EMOJI);
        let title = if article.body_letters_count > LONG_BODY_LETTERS {
            let short: String = article.title.chars().take(SHORT_TITLE_CHARS).collect();
            format!("{short}...")
        } else {
            article.title.clone()
        };
        truncate_excerpt(&format!("{emoji} {title}"))
    }
}

#[async_trait]
impl ArticleProvider for ZennProvider {
    type Raw = ZennArticle;

    fn name(&self) -> &'static str {
        "Zenn"
    }

    fn source(&self) -> Source {
        Source::Zenn
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    async fn fetch_articles(&self) -> Result<Vec<ZennArticle>, FetchError> {
        let url = self.endpoint()?;
        let response: ZennResponse = self.fetcher.get_json(&url, &self.config.username).await?;
        Ok(decode_items(self.name(), response.articles))
    }

    fn transform_article(&self, article: ZennArticle) -> UnifiedPost {
        let tags: Vec<String> = article
            .topics
            .iter()
            .map(|t| t.name().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        UnifiedPost {
            slug: format!("{}-{}", Source::Zenn, article.slug),
            title: article.title.clone(),
            date: normalize_date(article.published_at.as_deref()),
            category: infer_category(&tags, &KEYWORDS),
            excerpt: Self::excerpt(&article),
            content: None,
            url: self.article_url(&article.slug),
            source: Source::Zenn,
            extras: PostExtras {
                likes: Some(article.liked_count),
                emoji: Some(
                    article
                        .emoji
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
                ),
                published: article.published,
                ..PostExtras::default()
            },
            tags,
        }
    }
}
