use crate::cache::ArticleCache;
use crate::categorize::{infer_category, KeywordSet};
use crate::config::ProviderConfig;
use crate::fetcher::{Fetcher, ACCEPT_FEED};
use crate::parser::{FeedItem, FeedParser};
use crate::traits::ArticleProvider;
use crate::types::{FetchError, PostExtras, Source, UnifiedPost};
use crate::utils::text::{strip_html, truncate_excerpt};
use async_trait::async_trait;
use chrono::Utc;
use url::Url;

pub const NOTE_SITE_URL: &str = "https://note.com";

// Note items carry no tags, so these are matched against title + description.
const KEYWORDS: KeywordSet = KeywordSet {
    life: &[
        "日記", "エッセイ", "キャリア", "転職", "雑記", "暮らし", "子育て", "旅行", "diary",
        "essay", "career",
    ],
    tech: &[
        "プログラミング", "エンジニア", "コード", "開発", "システム", "javascript",
        "typescript", "react", "vue", "angular", "node.js", "python", "java", "golang",
        "php", "ruby", "フロントエンド", "バックエンド", "api", "データベース", "aws", "gcp",
        "azure", "docker", "kubernetes", "github", "git", "ci/cd", "devops", "技術", "アプリ",
        "ウェブ", "サイト",
    ],
};

/// A feed item together with the article id taken from its link.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteArticle {
    pub slug: String,
    pub item: FeedItem,
}

impl From<FeedItem> for NoteArticle {
    fn from(item: FeedItem) -> Self {
        Self {
            slug: note_slug(&item.link),
            item,
        }
    }
}

/// Note articles through the per-user RSS feed.
pub struct NoteProvider {
    config: ProviderConfig,
    cache: ArticleCache,
    fetcher: Fetcher,
    site_url: String,
}

impl NoteProvider {
    pub fn new(config: ProviderConfig, fetcher: Fetcher) -> Self {
        Self::with_site_url(config, fetcher, NOTE_SITE_URL)
    }

    pub fn with_site_url(config: ProviderConfig, fetcher: Fetcher, site_url: impl Into<String>) -> Self {
        let cache = ArticleCache::from_hours(config.cache_duration_hours);
        Self {
            config,
            cache,
            fetcher,
            site_url: site_url.into(),
        }
    }

    /// `<site>/<username>/rss`
    pub fn feed_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.site_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&self.config.username)
            .push("rss");
        Ok(url)
    }

    /// Items of an already downloaded feed, ready for [`ArticleProvider::transform_article`].
    pub fn parse_feed(content: &str) -> Vec<NoteArticle> {
        FeedParser::parse_items(content)
            .into_iter()
            .map(NoteArticle::from)
            .collect()
    }
}

/// The article id of a Note link: the segment after `/n/`, else the last
/// path segment, else a timestamp.
pub fn note_slug(link: &str) -> String {
    let segments: Vec<String> = match Url::parse(link) {
        Ok(url) => url
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
        Err(_) => link
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    };

    if let Some(pos) = segments.iter().rposition(|s| s == "n") {
        if let Some(id) = segments.get(pos + 1) {
            return id.clone();
        }
    }

    segments
        .last()
        .cloned()
        .unwrap_or_else(|| Utc::now().timestamp_millis().to_string())
}

#[async_trait]
impl ArticleProvider for NoteProvider {
    type Raw = NoteArticle;

    fn name(&self) -> &'static str {
        "Note"
    }

    fn source(&self) -> Source {
        Source::Note
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    async fn fetch_articles(&self) -> Result<Vec<NoteArticle>, FetchError> {
        let url = self.feed_url()?;
        let body = self
            .fetcher
            .get_text(&url, ACCEPT_FEED, &self.config.username)
            .await?;
        Ok(Self::parse_feed(&body))
    }

    fn transform_article(&self, article: NoteArticle) -> UnifiedPost {
        let NoteArticle { slug, item } = article;

        let description = strip_html(&item.description);
        let excerpt_source = if description.is_empty() {
            strip_html(&item.title)
        } else {
            description.clone()
        };
        let category = infer_category([format!("{} {}", item.title, description)], &KEYWORDS);

        UnifiedPost {
            slug: format!("{}-{}", Source::Note, slug),
            title: item.title,
            date: item.published.unwrap_or_else(Utc::now),
            category,
            excerpt: truncate_excerpt(&excerpt_source),
            content: None,
            url: item.link,
            source: Source::Note,
            tags: Vec::new(),
            extras: PostExtras::default(),
        }
    }
}
