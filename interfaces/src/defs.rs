use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a post came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Internal,
    Zenn,
    Note,
    Qiita,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Internal => "internal",
            Source::Zenn => "zenn",
            Source::Note => "note",
            Source::Qiita => "qiita",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(Source::Internal),
            "zenn" => Ok(Source::Zenn),
            "note" => Ok(Source::Note),
            "qiita" => Ok(Source::Qiita),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Life,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::Life => "life",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tech" => Ok(Category::Tech),
            "life" => Ok(Category::Life),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Engagement data some platforms expose. Not part of the cross-source
/// contract; every field is dropped from JSON when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stocks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

/// The record every post is normalized into, whatever its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedPost {
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub category: Category,
    pub excerpt: String,
    /// Full body. Only locally authored posts carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub url: String,
    pub source: Source,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extras: PostExtras,
}

impl UnifiedPost {
    pub fn is_internal(&self) -> bool {
        self.source == Source::Internal
    }

    /// Copy of the post with the body removed, as listed in summaries.
    pub fn without_content(&self) -> Self {
        Self {
            content: None,
            ..self.clone()
        }
    }
}

// Object style note:
// Posts are rebuilt from scratch on every generation run. Nothing here is
// persisted except through the JSON artifacts the aggregator writes, so the
// types stay plain data with no identity beyond `slug`.
