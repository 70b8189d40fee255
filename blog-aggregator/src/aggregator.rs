use crate::content::ContentReader;
use crate::provider_manager::{count_by_source, ProviderManager};
use crate::types::{AggregatorError, Result, Source, UnifiedPost};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const COMBINED_FILE: &str = "blog-data.json";
pub const SUMMARY_FILE: &str = "blog-posts.json";
pub const CONTENT_DIR: &str = "blog-content";

/// Which artifacts a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputLayout {
    /// One `blog-data.json` holding every full record.
    Combined,
    /// `blog-posts.json` without content plus `blog-content/<slug>.json`.
    #[default]
    Split,
    Both,
}

impl OutputLayout {
    fn writes_combined(self) -> bool {
        matches!(self, OutputLayout::Combined | OutputLayout::Both)
    }

    fn writes_split(self) -> bool {
        matches!(self, OutputLayout::Split | OutputLayout::Both)
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub layout: OutputLayout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            layout: OutputLayout::default(),
        }
    }
}

/// One file of the split layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub file_name: String,
    pub post: UnifiedPost,
}

/// What a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub internal_count: usize,
    pub external_count: usize,
    pub by_source: BTreeMap<Source, usize>,
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn total(&self) -> usize {
        self.internal_count + self.external_count
    }
}

/// Internal posts, external posts, merge, sort, write.
pub struct BlogAggregator {
    reader: ContentReader,
    manager: ProviderManager,
    output: OutputConfig,
}

impl BlogAggregator {
    pub fn new(reader: ContentReader, manager: ProviderManager, output: OutputConfig) -> Self {
        Self {
            reader,
            manager,
            output,
        }
    }

    pub fn manager(&self) -> &ProviderManager {
        &self.manager
    }

    /// Full generation run. Only write failures surface as errors.
    pub async fn run(&self) -> Result<GenerationReport> {
        info!("Generating blog data");

        let internal = self.reader.read_posts();
        let external = self.manager.fetch_all_articles().await;
        let internal_count = internal.len();
        let external_count = external.len();

        let posts = merge_and_sort(internal, external);

        let mut report = GenerationReport {
            internal_count,
            external_count,
            by_source: count_by_source(&posts),
            written: Vec::new(),
        };

        ensure_output_dir(&self.output.dir)?;

        if self.output.layout.writes_combined() {
            report.written.push(write_combined(&self.output.dir, &posts)?);
        }
        if self.output.layout.writes_split() {
            report.written.push(write_summary(&self.output.dir, &posts)?);
            report
                .written
                .extend(write_content_files(&self.output.dir, &posts)?);
        }

        info!(
            total = report.total(),
            internal = report.internal_count,
            external = report.external_count,
            files = report.written.len(),
            "Blog data generated"
        );
        for (source, count) in &report.by_source {
            info!("  {}: {} posts", source, count);
        }

        Ok(report)
    }
}

/// Internal posts first, then external, stably sorted newest first.
pub fn merge_and_sort(internal: Vec<UnifiedPost>, external: Vec<UnifiedPost>) -> Vec<UnifiedPost> {
    let mut posts = internal;
    posts.extend(external);
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

/// The listing view: every post with `content` removed.
pub fn summarize(posts: &[UnifiedPost]) -> Vec<UnifiedPost> {
    posts.iter().map(UnifiedPost::without_content).collect()
}

/// One full record per post, named after its slug.
pub fn content_records(posts: &[UnifiedPost]) -> Vec<ContentRecord> {
    posts
        .iter()
        .map(|post| ContentRecord {
            file_name: format!("{}.json", file_stem(&post.slug)),
            post: post.clone(),
        })
        .collect()
}

// Slugs come from file names and remote ids; keep them to one path component.
fn file_stem(slug: &str) -> String {
    let stem: String = slug
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    match stem.trim_start_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}

pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| AggregatorError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Serialize to `<path>.tmp` and rename over `path`, so readers never see a
/// half-written artifact.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).map_err(|source| AggregatorError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| AggregatorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_combined(dir: &Path, posts: &[UnifiedPost]) -> Result<PathBuf> {
    let path = dir.join(COMBINED_FILE);
    write_json_atomic(&path, posts)?;
    info!(path = %path.display(), count = posts.len(), "Wrote combined blog data");
    Ok(path)
}

pub fn write_summary(dir: &Path, posts: &[UnifiedPost]) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    write_json_atomic(&path, &summarize(posts))?;
    info!(path = %path.display(), count = posts.len(), "Wrote post summary");
    Ok(path)
}

pub fn write_content_files(dir: &Path, posts: &[UnifiedPost]) -> Result<Vec<PathBuf>> {
    let content_dir = dir.join(CONTENT_DIR);
    ensure_output_dir(&content_dir)?;

    let mut written = Vec::with_capacity(posts.len());
    for record in content_records(posts) {
        let path = content_dir.join(&record.file_name);
        write_json_atomic(&path, &record.post)?;
        written.push(path);
    }
    info!(dir = %content_dir.display(), count = written.len(), "Wrote per-post content files");
    Ok(written)
}
