use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use listing_parser::{HttpImageProbe, HttpRenderer, ListingScraper, PageRenderer, ScraperConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RendererKind {
    /// Plain HTTP fetch of the server-rendered page
    Http,
    /// Headless Chrome (needs the `headless` feature)
    Chrome,
}

#[derive(Parser)]
#[command(name = "listing-parser")]
#[command(about = "Extract a batdongsan.com.vn listing as JSON")]
struct Cli {
    /// Listing URL
    url: String,

    #[arg(long, value_enum, default_value = "http")]
    renderer: RendererKind,

    /// Image validation pool size
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// Write `batdongsan_<code>.json` in the current directory
    #[arg(long, conflicts_with = "output")]
    save: bool,

    /// Write the JSON to this path instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("listing_parser=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env().context("failed to load configuration")?;
    if let Some(n) = cli.concurrency {
        config.image_concurrency = n as usize;
    }

    let renderer = build_renderer(cli.renderer, &config)?;
    let probe = Arc::new(HttpImageProbe::from_config(&config)?);
    let scraper = ListingScraper::with_components(config, renderer, probe);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let record = scraper.scrape_with_cancel(&cli.url, &cancel).await?;

    let json = if cli.compact {
        serde_json::to_string(&record)?
    } else {
        serde_json::to_string_pretty(&record)?
    };

    let target = match (cli.output, cli.save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(format!("{}.json", record.export_stem()))),
        (None, false) => None,
    };

    match target {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "listing saved");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn build_renderer(kind: RendererKind, config: &ScraperConfig) -> Result<Arc<dyn PageRenderer>> {
    match kind {
        RendererKind::Http => Ok(Arc::new(HttpRenderer::from_config(config)?)),
        #[cfg(feature = "headless")]
        RendererKind::Chrome => Ok(Arc::new(listing_parser::render::ChromeRenderer::new(config))),
        #[cfg(not(feature = "headless"))]
        RendererKind::Chrome => {
            anyhow::bail!("the chrome renderer needs a build with `--features headless`")
        }
    }
}
