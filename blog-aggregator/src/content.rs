use crate::types::{Category, ParseError, PostExtras, Source, UnifiedPost};
use crate::utils::text::{strip_markdown, truncate_excerpt};
use crate::utils::time::parse_date;
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const DEFAULT_CONTENT_DIR: &str = "src/app/content/blog";

const DELIMITER: &str = "---";

/// Header block of a markdown post.
#[derive(Debug, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Kept loose: YAML may hand over a string or a bare number.
    pub date: Option<serde_yaml::Value>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Split `---`-delimited YAML from the body. The body starts right after the
/// closing delimiter line and is otherwise returned untouched.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let first_line_end = text.find('\n')?;
    if text[..first_line_end].trim_end() != DELIMITER {
        return None;
    }

    let rest = &text[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Reads locally authored posts from a directory of `*.md` files.
pub struct ContentReader {
    dir: PathBuf,
}

impl ContentReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every post that parses. A missing directory yields nothing; a broken
    /// file is logged and left out.
    pub fn read_posts(&self) -> Vec<UnifiedPost> {
        if !self.dir.exists() {
            warn!(dir = %self.dir.display(), "Blog content directory not found");
            return Vec::new();
        }

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Error reading internal posts");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("md"))
            .collect();
        paths.sort();

        let posts: Vec<UnifiedPost> = paths
            .iter()
            .filter_map(|path| match Self::read_post(path) {
                Ok(post) => Some(post),
                Err(e) => {
                    error!(error = %e, "Error processing post");
                    None
                }
            })
            .collect();

        info!("Found {} internal posts", posts.len());
        posts
    }

    pub fn read_post(path: &Path) -> Result<UnifiedPost, ParseError> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self::parse_post(path, &slug, &text)
    }

    pub fn parse_post(path: &Path, slug: &str, text: &str) -> Result<UnifiedPost, ParseError> {
        let (yaml, body) = split_front_matter(text).ok_or_else(|| ParseError::FrontMatter {
            path: path.to_path_buf(),
            reason: "missing `---` front matter block".to_string(),
        })?;

        let front: FrontMatter = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| ParseError::FrontMatter {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        let title = front
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ParseError::MissingField {
                path: path.to_path_buf(),
                field: "title",
            })?;

        let category: Category = front
            .category
            .ok_or_else(|| ParseError::MissingField {
                path: path.to_path_buf(),
                field: "category",
            })?
            .parse()
            .map_err(|reason| ParseError::UnknownCategory {
                path: path.to_path_buf(),
                reason,
            })?;

        let date = match front.date.as_ref().and_then(yaml_scalar).as_deref().and_then(parse_date) {
            Some(date) => date,
            None => {
                warn!(path = %path.display(), "Missing or unreadable date, using current time");
                Utc::now()
            }
        };

        let excerpt = match front.excerpt.filter(|e| !e.trim().is_empty()) {
            Some(excerpt) => excerpt,
            None => truncate_excerpt(&strip_markdown(body)),
        };

        Ok(UnifiedPost {
            slug: slug.to_string(),
            title,
            date,
            category,
            excerpt,
            content: Some(body.to_string()),
            url: format!("/blog/{slug}"),
            source: Source::Internal,
            tags: front.tags.unwrap_or_default(),
            extras: PostExtras::default(),
        })
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
