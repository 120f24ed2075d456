//! emo-analyzer - command-line front end
//!
//! **Usage:**
//! ```bash
//! emo-analyzer [--config PATH] [--log-level LEVEL] analyze <FILE>... [--jobs N] [--pretty] [--features]
//! emo-analyzer [--config PATH] health [--pretty]
//! ```
//!
//! Results are printed to stdout as one JSON document per file; logs go to
//! stderr (or the configured log file).

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use emo_analyzer::{AnalyzerConfig, EmotionAnalyzer};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for emo-analyzer
#[derive(Parser, Debug)]
#[command(name = "emo-analyzer")]
#[command(about = "Infer the dominant emotion of short audio clips")]
#[command(version)]
struct Args {
    /// Configuration file (overrides EMO_CONFIG and the platform default)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more audio files
    Analyze {
        /// Audio files to analyze
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Concurrent analyses (default: limits.max_concurrent_jobs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Include the feature vector in the output
        #[arg(long)]
        features: bool,
    },

    /// Print the capability report
    Health {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AnalyzerConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, config.logging.file.as_deref())?;

    info!("emo-analyzer {} starting", env!("CARGO_PKG_VERSION"));

    let analyzer = Arc::new(EmotionAnalyzer::from_config(&config));

    match args.command {
        Command::Analyze {
            files,
            jobs,
            pretty,
            features,
        } => {
            let jobs = jobs.unwrap_or(config.limits.max_concurrent_jobs).max(1);
            run_analyze(
                analyzer,
                files,
                jobs,
                config.limits.max_input_bytes,
                pretty,
                features,
            )
            .await
        }
        Command::Health { pretty } => {
            let report = analyzer.capabilities().await;
            println!("{}", render(&report, pretty)?);
            Ok(())
        }
    }
}

/// Initialize tracing to stderr or an append-mode log file
fn init_tracing(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

async fn run_analyze(
    analyzer: Arc<EmotionAnalyzer>,
    files: Vec<PathBuf>,
    jobs: usize,
    max_input_bytes: u64,
    pretty: bool,
    features: bool,
) -> Result<()> {
    let total = files.len();
    info!("Analyzing {} file(s) with {} concurrent job(s)", total, jobs);

    let mut outputs = stream::iter(files.into_iter().map(|path| {
        let analyzer = Arc::clone(&analyzer);
        async move {
            let outcome = analyze_file(&analyzer, &path, max_input_bytes, features).await;
            (path, outcome)
        }
    }))
    .buffered(jobs);

    let mut failed = 0usize;
    while let Some((path, outcome)) = outputs.next().await {
        let file = path.display().to_string();
        let document = match outcome {
            Ok(value) => {
                let mut document = json!({ "file": file });
                if let (Value::Object(doc), Value::Object(fields)) = (&mut document, value) {
                    doc.extend(fields);
                }
                document
            }
            Err(e) => {
                failed += 1;
                warn!("{}: {:#}", file, e);
                json!({ "file": file, "error": format!("{:#}", e) })
            }
        };
        println!("{}", render(&document, pretty)?);
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} file(s) failed", failed, total));
    }
    Ok(())
}

/// Read and analyze one file; `Ok` holds the `result` (and `features`) fields
async fn analyze_file(
    analyzer: &EmotionAnalyzer,
    path: &Path,
    max_input_bytes: u64,
    features: bool,
) -> Result<Value> {
    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot stat {}", path.display()))?
        .len();
    if size > max_input_bytes {
        return Err(anyhow!(
            "File too large: {} bytes (limit {})",
            size,
            max_input_bytes
        ));
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let detailed = analyzer.analyze_detailed(&bytes, &filename).await?;

    let mut value = json!({ "result": detailed.result });
    if features {
        value["features"] = serde_json::to_value(&detailed.features)?;
    }
    Ok(value)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
