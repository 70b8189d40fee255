mod common;

use blog_aggregator::aggregator::{
    content_records, merge_and_sort, summarize, COMBINED_FILE, CONTENT_DIR, SUMMARY_FILE,
};
use blog_aggregator::{
    BlogAggregator, Category, ContentReader, OutputConfig, OutputLayout, ProviderManager,
    PullFeed, RunMode, Source, UnifiedPost,
};
use common::{date, init_tracing, post, MockProvider};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const HELLO_BODY: &str = "\n# Hello\n\nFirst **post** with a [link](https://example.com).\n\n```rust\nfn main() {}\n```\n";

fn write_post(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn content_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_post(
        dir.path(),
        "hello-world.md",
        &format!(
            "---\ntitle: Hello World\ndate: 2024-01-10\ncategory: tech\ntags:\n  - rust\n  - blog\n---\n{HELLO_BODY}"
        ),
    );
    write_post(
        dir.path(),
        "weekend.md",
        "---\ntitle: \"Weekend\"\ndate: \"2024-03-02T09:30:00+09:00\"\ncategory: Life\nexcerpt: A quiet weekend.\n---\nSlept in.\n",
    );
    dir
}

fn external_manager() -> ProviderManager {
    let zenn: Arc<dyn PullFeed> = Arc::new(MockProvider::new(
        "Zenn",
        Source::Zenn,
        vec![
            post("zenn-new", Source::Zenn, date(2024, 4, 1)),
            post("zenn-old", Source::Zenn, date(2023, 12, 1)),
        ],
    ));
    let qiita: Arc<dyn PullFeed> = Arc::new(MockProvider::new(
        "Qiita",
        Source::Qiita,
        vec![post("qiita-mid", Source::Qiita, date(2024, 2, 1))],
    ));
    ProviderManager::with_providers(vec![zenn, qiita], true, RunMode::Production)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn internal_posts_are_read_from_front_matter() {
    init_tracing();

    let dir = content_dir();
    let posts = ContentReader::new(dir.path()).read_posts();
    assert_eq!(posts.len(), 2);

    let hello = &posts[0];
    assert_eq!(hello.slug, "hello-world");
    assert_eq!(hello.title, "Hello World");
    assert_eq!(hello.date, date(2024, 1, 10));
    assert_eq!(hello.category, Category::Tech);
    assert_eq!(hello.url, "/blog/hello-world");
    assert!(hello.is_internal());
    assert_eq!(hello.tags, ["rust", "blog"]);
    assert_eq!(hello.content.as_deref(), Some(HELLO_BODY));
    // No excerpt in the front matter: derived from the body.
    assert_eq!(hello.excerpt, "Hello First post with a link.");

    let weekend = &posts[1];
    assert_eq!(weekend.category, Category::Life);
    assert_eq!(weekend.excerpt, "A quiet weekend.");
    assert_eq!(weekend.date.to_rfc3339(), "2024-03-02T00:30:00+00:00");
    assert!(weekend.tags.is_empty());
}

#[test]
fn broken_files_are_skipped() {
    init_tracing();

    let dir = content_dir();
    write_post(dir.path(), "no-category.md", "---\ntitle: Missing\ndate: 2024-01-01\n---\nbody\n");
    write_post(dir.path(), "food.md", "---\ntitle: Ramen\ncategory: food\n---\nbody\n");
    write_post(dir.path(), "plain.md", "# No front matter\n");
    write_post(dir.path(), "bad-yaml.md", "---\ntitle: [unclosed\n---\nbody\n");
    write_post(dir.path(), "notes.txt", "---\ntitle: Not markdown\ncategory: tech\n---\n");

    let posts = ContentReader::new(dir.path()).read_posts();
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["hello-world", "weekend"]);
}

#[test]
fn missing_date_resolves_to_now() {
    let post = ContentReader::parse_post(
        Path::new("undated.md"),
        "undated",
        "---\ntitle: Undated\ncategory: life\ndate: someday\n---\nx\n",
    )
    .unwrap();
    assert!(chrono::Utc::now() - post.date < chrono::Duration::minutes(1));
}

#[test]
fn missing_directory_yields_no_posts() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let reader = ContentReader::new(dir.path().join("does-not-exist"));
    assert!(reader.read_posts().is_empty());
}

#[test]
fn merged_posts_are_newest_first() {
    let internal = vec![
        post("a", Source::Internal, date(2024, 1, 1)),
        post("b", Source::Internal, date(2024, 3, 1)),
    ];
    let external = vec![
        post("zenn-c", Source::Zenn, date(2024, 2, 1)),
        post("qiita-d", Source::Qiita, date(2024, 3, 1)),
    ];

    let merged = merge_and_sort(internal, external);

    let slugs: Vec<&str> = merged.iter().map(|p| p.slug.as_str()).collect();
    // Equal dates keep concatenation order.
    assert_eq!(slugs, ["b", "qiita-d", "zenn-c", "a"]);
    assert!(merged.windows(2).all(|w| w[0].date >= w[1].date));
}

#[test]
fn summary_and_records_are_pure_views() {
    let mut internal = post("hello", Source::Internal, date(2024, 1, 1));
    internal.content = Some("body".to_string());
    let posts = vec![internal.clone(), post("zenn-x", Source::Zenn, date(2023, 1, 1))];

    let summary = summarize(&posts);
    assert!(summary.iter().all(|p| p.content.is_none()));
    assert_eq!(posts[0].content.as_deref(), Some("body"));

    let records = content_records(&posts);
    assert_eq!(records[0].file_name, "hello.json");
    assert_eq!(records[0].post, internal);
    assert_eq!(records[1].file_name, "zenn-x.json");
}

#[tokio::test]
async fn generation_writes_every_layout() {
    init_tracing();

    let content = content_dir();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("public");

    let aggregator = BlogAggregator::new(
        ContentReader::new(content.path()),
        external_manager(),
        OutputConfig {
            dir: out_dir.clone(),
            layout: OutputLayout::Both,
        },
    );

    let report = aggregator.run().await.unwrap();

    assert_eq!(report.internal_count, 2);
    assert_eq!(report.external_count, 3);
    assert_eq!(report.by_source.get(&Source::Internal), Some(&2));
    // combined + summary + one file per post
    assert_eq!(report.written.len(), 2 + 5);

    let combined: Vec<UnifiedPost> = serde_json::from_value(read_json(&out_dir.join(COMBINED_FILE))).unwrap();
    let order: Vec<&str> = combined.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(order, ["zenn-new", "weekend", "qiita-mid", "hello-world", "zenn-old"]);

    let summary = read_json(&out_dir.join(SUMMARY_FILE));
    let entries = summary.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.get("content").is_none()));
    assert_eq!(entries[0]["source"], "zenn");
    assert_eq!(entries[3]["date"], "2024-01-10T00:00:00Z");

    let hello = read_json(&out_dir.join(CONTENT_DIR).join("hello-world.json"));
    assert_eq!(hello["content"], HELLO_BODY);
    assert_eq!(hello["url"], "/blog/hello-world");

    let zenn = read_json(&out_dir.join(CONTENT_DIR).join("zenn-new.json"));
    assert!(zenn.get("content").is_none());

    let leftovers: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn development_run_writes_internal_posts_only() {
    init_tracing();

    let content = content_dir();
    let output = tempfile::tempdir().unwrap();

    let zenn = Arc::new(MockProvider::new(
        "Zenn",
        Source::Zenn,
        vec![post("zenn-new", Source::Zenn, date(2024, 4, 1))],
    ));
    let manager = ProviderManager::with_providers(vec![zenn.clone() as Arc<dyn PullFeed>], true, RunMode::Development);

    let aggregator = BlogAggregator::new(
        ContentReader::new(content.path()),
        manager,
        OutputConfig {
            dir: output.path().to_path_buf(),
            layout: OutputLayout::Combined,
        },
    );
    let report = aggregator.run().await.unwrap();

    assert_eq!(report.external_count, 0);
    assert_eq!(zenn.call_count(), 0);
    assert!(!output.path().join(SUMMARY_FILE).exists());

    let combined = read_json(&output.path().join(COMBINED_FILE));
    assert_eq!(combined.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unwritable_output_is_an_error() {
    init_tracing();

    let output = tempfile::tempdir().unwrap();
    // A file where the output directory should be.
    let blocked = output.path().join("public");
    fs::write(&blocked, "not a directory").unwrap();

    let aggregator = BlogAggregator::new(
        ContentReader::new(output.path().join("content")),
        ProviderManager::with_providers(Vec::new(), false, RunMode::Production),
        OutputConfig {
            dir: blocked,
            layout: OutputLayout::Split,
        },
    );

    assert!(aggregator.run().await.is_err());
}
