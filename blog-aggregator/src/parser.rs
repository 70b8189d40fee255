use crate::types::ParseError;
use crate::utils::time::parse_date;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

static RE_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item>").unwrap());
static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title>").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<link(?:\s[^>]*)?>(.*?)</link>").unwrap());
static RE_PUB_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pubDate(?:\s[^>]*)?>(.*?)</pubDate>").unwrap());
static RE_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<description(?:\s[^>]*)?>(.*?)</description>").unwrap());
static RE_CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// One syndication item reduced to the fields the site cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    /// Raw description, possibly HTML.
    pub description: String,
}

pub struct FeedParser;

impl FeedParser {
    /// Parse an RSS document. A document the feed parser rejects as a whole
    /// is scanned item by item instead, so one broken item only costs itself.
    pub fn parse_items(content: &str) -> Vec<FeedItem> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let items = match Self::parse_document(content) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "feed rejected as a whole, scanning items individually");
                Self::scan_items(content)
            }
        };

        info!("Parsed feed with {} items", items.len());
        items
    }

    pub fn parse_document(content: &str) -> Result<Vec<FeedItem>, ParseError> {
        let feed = parser::parse(content.as_bytes())
            .map_err(|e| ParseError::Feed(format!("Failed to parse feed: {}", e)))?;

        Ok(feed.entries.into_iter().filter_map(Self::from_entry).collect())
    }

    fn from_entry(entry: feed_rs::model::Entry) -> Option<FeedItem> {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .filter(|l| !l.is_empty());

        let (Some(title), Some(link)) = (title, link) else {
            debug!(id = %entry.id, "Skipping item without title or link");
            return None;
        };

        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        Some(FeedItem {
            title,
            link,
            published: entry.published.or(entry.updated),
            description,
        })
    }

    /// Tag-scoped extraction over raw `<item>` blocks.
    pub fn scan_items(content: &str) -> Vec<FeedItem> {
        RE_ITEM
            .captures_iter(content)
            .filter_map(|caps| match Self::scan_item(&caps[1]) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(error = %e, "Skipping feed item");
                    None
                }
            })
            .collect()
    }

    fn scan_item(block: &str) -> Result<FeedItem, ParseError> {
        let title = extract_tag(&RE_TITLE, block);
        let link = extract_tag(&RE_LINK, block);

        if title.is_empty() || link.is_empty() {
            return Err(ParseError::Item {
                provider: "feed",
                reason: "missing title or link".to_string(),
            });
        }

        let pub_date = extract_tag(&RE_PUB_DATE, block);

        Ok(FeedItem {
            title,
            link,
            published: parse_date(&pub_date),
            description: extract_tag(&RE_DESCRIPTION, block),
        })
    }
}

fn extract_tag(re: &Regex, block: &str) -> String {
    re.captures(block)
        .map(|caps| strip_cdata(&caps[1]))
        .unwrap_or_default()
}

/// Unwrap `<![CDATA[...]]>` sections, decoding entities outside them.
pub fn strip_cdata(text: &str) -> String {
    if RE_CDATA.is_match(text) {
        RE_CDATA.replace_all(text, "$1").trim().to_string()
    } else {
        html_escape::decode_html_entities(text.trim()).to_string()
    }
}

/// Decode a JSON array one element at a time; elements of the wrong shape
/// are logged and dropped.
pub fn decode_items<T: DeserializeOwned>(provider: &'static str, values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                let err = ParseError::Item {
                    provider,
                    reason: format!("element {index}: {e}"),
                };
                warn!(error = %err, "Skipping malformed article");
                None
            }
        })
        .collect()
}
