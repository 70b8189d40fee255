use anyhow::Context;
use blog_aggregator::content::DEFAULT_CONTENT_DIR;
use blog_aggregator::{
    BlogAggregator, ContentReader, FetchConfig, GeneratorConfig, OutputConfig, OutputLayout,
    ProviderManager, RunMode,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Build the static blog data consumed by the site.
#[derive(Debug, Parser)]
#[command(name = "generate-blog-data", version)]
struct Cli {
    /// Skip external platforms
    #[arg(long, conflicts_with = "prod")]
    dev: bool,

    /// Fetch from every configured platform (default)
    #[arg(long)]
    prod: bool,

    #[arg(long, default_value = DEFAULT_CONTENT_DIR)]
    content_dir: PathBuf,

    #[arg(long, default_value = "public")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputLayout::Split)]
    layout: OutputLayout,

    #[arg(long, default_value = ".env.local")]
    env_file: PathBuf,
}

impl Cli {
    fn mode(&self) -> RunMode {
        if self.dev {
            RunMode::Development
        } else {
            RunMode::Production
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Blog data generation failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = cli.mode();
    info!(mode = mode.as_str(), "Starting blog data generation");

    let config = GeneratorConfig::load(&cli.env_file);
    let manager = ProviderManager::new(&config, mode, FetchConfig::default())
        .context("failed to set up external providers")?;

    let aggregator = BlogAggregator::new(
        ContentReader::new(&cli.content_dir),
        manager,
        OutputConfig {
            dir: cli.output_dir.clone(),
            layout: cli.layout,
        },
    );

    let report = aggregator
        .run()
        .await
        .with_context(|| format!("failed to write blog data to {}", cli.output_dir.display()))?;

    info!(
        posts = report.total(),
        files = report.written.len(),
        "Done"
    );
    Ok(())
}
