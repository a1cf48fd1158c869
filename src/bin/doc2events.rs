//! CLI binary for doc2events.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the extracted events as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use doc2events::{
    DocumentInput, EventExtractor, ExtractionConfig, HeuristicRegex, ModelBacked,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Photographed/scanned raster image (layout analysis + CSV table).
    Image,
    /// Native-text PDF (direct page-text extraction).
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Model-backed extraction (default).
    Model,
    /// Regex date/time scanning; no model call, coarser results.
    Heuristic,
}

/// Extract calendar events from a photographed or scanned document.
#[derive(Parser, Debug)]
#[command(name = "doc2events", version, about)]
struct Cli {
    /// Input document (image or PDF).
    input: PathBuf,

    /// Document kind. Inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    kind: Option<Kind>,

    /// Extraction strategy.
    #[arg(long, value_enum, default_value = "model")]
    strategy: Strategy,

    /// Model identifier.
    #[arg(long, env = "DOC2EVENTS_MODEL")]
    model: Option<String>,

    /// Model-invocation endpoint URL.
    #[arg(long, env = "DOC2EVENTS_MODEL_ENDPOINT")]
    model_endpoint: Option<String>,

    /// Layout-analysis endpoint URL (required for images).
    #[arg(long, env = "DOC2EVENTS_LAYOUT_ENDPOINT")]
    layout_endpoint: Option<String>,

    /// Maximum tokens the model may generate.
    #[arg(long, default_value_t = 2500)]
    max_tokens: usize,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.5)]
    temperature: f32,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn infer_kind(path: &PathBuf) -> Option<Kind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(Kind::Pdf),
        "jpg" | "jpeg" | "png" => Some(Kind::Image),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let kind = match cli.kind.or_else(|| infer_kind(&cli.input)) {
        Some(kind) => kind,
        None => bail!(
            "Cannot infer document kind from '{}'; pass --kind image|pdf",
            cli.input.display()
        ),
    };

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read '{}'", cli.input.display()))?;

    let mut builder = ExtractionConfig::builder()
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature);
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(endpoint) = cli.model_endpoint {
        builder = builder.model_endpoint(endpoint);
    }
    if let Some(endpoint) = cli.layout_endpoint {
        builder = builder.layout_endpoint(endpoint);
    }
    let config = builder.build()?;

    let document = match kind {
        Kind::Image => DocumentInput::Image(bytes),
        Kind::Pdf => DocumentInput::Pdf(bytes),
    };

    let list = match cli.strategy {
        Strategy::Model => ModelBacked::new(config).extract(&document).await?,
        Strategy::Heuristic => HeuristicRegex::new(config).extract(&document).await?,
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&list)?
    } else {
        serde_json::to_string(&list)?
    };
    println!("{json}");

    if list.events.is_empty() {
        eprintln!("No events found (or extraction degraded to an empty list).");
    }

    Ok(())
}
