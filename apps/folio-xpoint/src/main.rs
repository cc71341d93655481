//! Folio xpoint tool
//!
//! Builds position indexes for EPUB files and resolves e-reader location
//! strings against them, printing JSON.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_xpoint::{Config, IndexingService, Position};

#[derive(Parser)]
#[command(name = "folio-xpoint", version, about = "Index EPUB reading positions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the position index of an EPUB and print a summary
    Index {
        /// EPUB file
        epub: PathBuf,
    },
    /// Resolve location strings against an EPUB
    Resolve {
        /// EPUB file
        epub: PathBuf,
        /// Location strings, e.g. /body/DocFragment[2]/body/p[3]/text().10
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

#[derive(Serialize)]
struct ResolvedAddress<'a> {
    address: &'a str,
    position: Option<Position>,
    reason: Option<String>,
}

const DEFAULT_LOG_FILTER: &str = "folio_xpoint=debug";

/// `RUST_LOG` if set (the process environment or `.env`), else the default
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Book id derived from the file name, as the library scanner does
fn book_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may set RUST_LOG, so load it before the subscriber reads the filter
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries JSON
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::debug!("Configuration: {:?}", config);

    let service = IndexingService::new(config);

    match cli.command {
        Command::Index { epub } => {
            let book_id = book_id_from_path(&epub);
            let index = service
                .index_epub_path(&book_id, epub.clone())
                .await
                .with_context(|| format!("indexing {}", epub.display()))?;

            println!("{}", serde_json::to_string_pretty(&index.summary())?);
        }
        Command::Resolve { epub, addresses } => {
            let book_id = book_id_from_path(&epub);
            service
                .index_epub_path(&book_id, epub.clone())
                .await
                .with_context(|| format!("indexing {}", epub.display()))?;
            let resolver = service
                .resolver(&book_id)
                .await
                .context("index missing from cache after build")?;

            for (address, resolution) in addresses.iter().zip(resolver.resolve_all(&addresses)) {
                let line = ResolvedAddress {
                    address,
                    position: resolution.position(),
                    reason: resolution.reason().map(|r| r.to_string()),
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }
    }

    Ok(())
}
