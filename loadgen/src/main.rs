use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use loadgen::batch::BatchBuilder;
use loadgen::category::CategoryStore;
use loadgen::deliver::{BatchSink, HttpSink, PrintSink};
use loadgen::event::EventFactory;
use loadgen::time::SystemTime;

/// Posts synthetic e-commerce telemetry batches to a collection endpoint.
#[derive(Parser)]
#[command(name = "loadgen")]
struct Args {
    /// Category table: CSV with category_id plus name (or name_en/name_fr),
    /// or the database exporter's JSON output
    #[arg(long)]
    categories: PathBuf,

    /// Collection endpoint URL
    #[arg(long, env = "EVENT_API_URL")]
    url: String,

    /// Number of batches to send
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Seed the generator for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log batches instead of sending them
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn load_categories(path: &Path) -> anyhow::Result<CategoryStore> {
    let store = if path.extension().is_some_and(|ext| ext == "json") {
        CategoryStore::from_json_path(path)
    } else {
        CategoryStore::from_csv_path(path)
    };
    store.with_context(|| format!("loading categories from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let categories = Arc::new(load_categories(&args.categories)?);
    tracing::info!(count = categories.len(), "loaded categories");

    let factory = EventFactory::new(categories, Arc::new(SystemTime {}));
    let builder = BatchBuilder::new(factory);

    let sink: Box<dyn BatchSink> = if args.dry_run {
        Box::new(PrintSink {})
    } else {
        Box::new(HttpSink::new(args.url.clone()).context("building HTTP client")?)
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut delivered = 0u32;
    for attempt in 1..=args.count {
        let batch = builder.build(&mut rng);

        match sink.deliver(&batch).await {
            Ok(()) => {
                delivered += 1;
                tracing::info!(
                    attempt,
                    events = batch.event_list.len(),
                    user_id = batch.device_info.user_id,
                    device = ?batch.device_info.device_id,
                    "batch delivered"
                );
            }
            Err(e) => {
                tracing::warn!(attempt, "batch failed: {}", e);
            }
        }
    }

    tracing::info!(delivered, total = args.count, "run complete");
    Ok(())
}
