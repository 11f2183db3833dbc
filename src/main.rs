use anyhow::Context;
use clap::{Parser, Subcommand};
use quotx::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Similarity-anchored quoting for CNC manufacturing parts
#[derive(Parser, Debug)]
#[command(name = "quotx")]
#[command(about = "Quote new parts against your historical jobs", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Collection name
    #[arg(long, default_value = "parts")]
    collection: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index historical parts from a JSON file of table rows
    Index {
        /// JSON array of row objects; requires a "Part Description" column
        #[arg(short = 'f', long)]
        data: PathBuf,

        /// Drop the existing collection before indexing
        #[arg(long)]
        rebuild: bool,
    },
    /// Quote a new part against the indexed history
    Quote {
        /// Free-text description of the part
        #[arg(short = 'q', long)]
        description: String,

        #[arg(long, default_value = "")]
        material: String,

        /// Dimensions, e.g. "100x50x5 mm"
        #[arg(long, default_value = "")]
        size: String,

        /// Comma-separated operations, e.g. "drilling, milling"
        #[arg(long, default_value = "")]
        operations: String,

        #[arg(long, default_value = "")]
        finish: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting quotx v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let store = Arc::new(IndexStore::open(&args.data_dir)?);
    let (embedder, completion) = build_providers();
    let retrieval = RetrievalService::new(store.clone(), &args.collection, embedder);

    match args.command {
        Command::Index { data, rebuild } => {
            if rebuild && store.reset(&args.collection)? {
                info!(collection = %args.collection, "dropped existing collection");
            }

            let raw = std::fs::read_to_string(&data)
                .with_context(|| format!("failed to read {}", data.display()))?;
            let rows: Vec<serde_json::Value> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of rows", data.display()))?;

            let indexed = retrieval.ingest_rows(&rows)?;
            info!(indexed, total = retrieval.count(), "ingestion complete");
            println!("Indexed {indexed} parts ({} total).", retrieval.count());
        }
        Command::Quote {
            description,
            material,
            size,
            operations,
            finish,
        } => {
            let engine = match completion {
                Some(provider) => QuoteEngine::with_completion(provider),
                None => QuoteEngine::rule_based(),
            };
            let mut session = QuoteSession::new(retrieval, engine);

            let query = QueryPart {
                description,
                material,
                size,
                operations,
                finish,
            };

            match session.quote(&query)? {
                QuoteOutcome::Complete { matched, breakdown } => {
                    println!("Closest past part (score {:.3}):", matched.score);
                    println!("  {}", matched.document);
                    println!("{}", serde_json::to_string_pretty(&breakdown)?);
                }
                QuoteOutcome::NoMatchFound => {
                    println!("No historical parts indexed yet. Run `quotx index` first.");
                }
                QuoteOutcome::DerivationFailed { matched, error } => {
                    warn!(%error, "derivation failed; surfacing raw output");
                    println!("Could not derive a valid quote against {}.", matched.id);
                    if let QuoteError::UnparseableResponse { raw, .. } = &error {
                        println!("Raw provider output (complete the quote manually):");
                        println!("{raw}");
                    } else {
                        println!("Reason: {error}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve provider credentials once, up front. Without credentials the
/// engine stays fully offline: hash embedding plus rule-based derivation.
fn build_providers() -> (Arc<dyn Embedder>, Option<Arc<dyn Completion>>) {
    match ProviderConfig::from_env() {
        Ok(config) => {
            let embedder = OpenAiEmbedder::new(&config);
            let completion = OpenAiCompletion::new(&config);
            match (embedder, completion) {
                (Ok(embedder), Ok(completion)) => {
                    info!("using OpenAI-compatible embedding and reasoning providers");
                    let embedder: Arc<dyn Embedder> = Arc::new(embedder);
                    let completion: Arc<dyn Completion> = Arc::new(completion);
                    (embedder, Some(completion))
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!(%e, "provider configuration rejected; falling back to offline mode");
                    (Arc::new(HashEmbedder::default()), None)
                }
            }
        }
        Err(e) => {
            info!(%e, "no provider credentials; using offline hash embedder and rule-based quoting");
            (Arc::new(HashEmbedder::default()), None)
        }
    }
}
