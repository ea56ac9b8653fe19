//! Groundcrew CLI - query a policy corpus from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Search a corpus file
//! gc --corpus corpus.json "refund policy"
//! gc --corpus corpus.json "rebooking rules" -n 3 --category billing
//! gc --corpus corpus.json "crew rest" --json
//!
//! # Show corpus statistics
//! gc --corpus corpus.json --stats
//! ```
//!
//! The corpus file is a JSON array of documents, each with `title`,
//! `content`, optional `metadata`, and an optional pre-computed
//! `embedding`. No embedding provider is wired in, so queries run
//! lexical-only; the `mode` field in the output says so explicitly.

mod corpus;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use groundcrew_core::search::{RetrievalEngine, SearchRequest};

/// Groundcrew policy search CLI.
///
/// Runs hybrid (lexical + vector) retrieval over a corpus loaded from a
/// JSON file.
#[derive(Parser)]
#[command(name = "gc", version, about)]
struct Cli {
    /// Search query
    query: Option<String>,

    /// Path to the corpus JSON file
    #[arg(long)]
    corpus: PathBuf,

    /// Maximum number of results to return
    #[arg(short = 'n', long, default_value = "5")]
    limit: usize,

    /// Restrict the search to one category
    #[arg(long)]
    category: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Print corpus statistics instead of searching
    #[arg(long)]
    stats: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store = corpus::load(&cli.corpus)
        .await
        .with_context(|| format!("Failed to load corpus from {}", cli.corpus.display()))?;

    let engine = RetrievalEngine::new(store, corpus::UnavailableEmbedder);

    if cli.stats {
        let stats = engine.stats().await?;
        println!("{}", output::format_stats(&stats));
        return Ok(());
    }

    match &cli.query {
        Some(query) => {
            let request = SearchRequest {
                query: query.clone(),
                k: cli.limit,
                category: cli.category.clone(),
            };
            let response = engine.search(&request).await?;

            let rendered = if cli.json {
                output::format_json(query, &response)
            } else {
                output::format_human(query, &response)
            };
            println!("{}", rendered);
        }
        None => {
            eprintln!("No search query provided. Use --help for usage information.");
            std::process::exit(1);
        }
    }

    Ok(())
}
