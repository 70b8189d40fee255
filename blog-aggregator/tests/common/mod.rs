#![allow(dead_code)]

use async_trait::async_trait;
use blog_aggregator::{
    ArticleCache, ArticleProvider, Category, FetchConfig, FetchError, Fetcher, PostExtras,
    ProviderConfig, Source, UnifiedPost,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
}

pub fn provider_config(account: &str, use_cache: bool) -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        username: account.to_string(),
        use_cache,
        cache_duration_hours: 24,
    }
}

/// Fetcher that fails fast: no retry delay, short timeout.
pub fn test_fetcher(max_retries: u32) -> Fetcher {
    Fetcher::new(FetchConfig {
        timeout_seconds: 5,
        max_retries,
        retry_delay_seconds: 0,
        ..FetchConfig::default()
    })
    .expect("http client")
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn post(slug: &str, source: Source, date: DateTime<Utc>) -> UnifiedPost {
    UnifiedPost {
        slug: slug.to_string(),
        title: format!("Post {slug}"),
        date,
        category: Category::Tech,
        excerpt: format!("About {slug}"),
        content: None,
        url: format!("https://example.com/{slug}"),
        source,
        tags: Vec::new(),
        extras: PostExtras::default(),
    }
}

/// A local HTTP/1.1 server answering every request with the same response.
/// Returns the base URL and a counter of accepted connections.
pub async fn serve(status: &'static str, content_type: &'static str, body: String) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    RateLimited,
    Panic,
}

/// Provider with canned posts that counts how often it is asked to fetch.
pub struct MockProvider {
    name: &'static str,
    source: Source,
    config: ProviderConfig,
    cache: ArticleCache,
    posts: Vec<UnifiedPost>,
    behavior: Behavior,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(name: &'static str, source: Source, posts: Vec<UnifiedPost>) -> Self {
        Self {
            name,
            source,
            config: provider_config("tester", false),
            cache: ArticleCache::from_hours(24),
            posts,
            behavior: Behavior::Succeed,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleProvider for MockProvider {
    type Raw = UnifiedPost;

    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> Source {
        self.source
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    async fn fetch_articles(&self) -> Result<Vec<UnifiedPost>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.behavior {
            Behavior::Succeed => Ok(self.posts.clone()),
            Behavior::Fail => Err(FetchError::Http {
                status: 503,
                reason: "Service Unavailable".to_string(),
            }),
            Behavior::RateLimited => Err(FetchError::RateLimited),
            Behavior::Panic => panic!("{} blew up", self.name),
        }
    }

    fn transform_article(&self, raw: UnifiedPost) -> UnifiedPost {
        raw
    }
}
