use anyhow::{Context, Result};
use clap::Parser;
use pubmed_indexer::{config::Config, logging, opensearch::OpenSearchService, processing};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "pubmed-indexer",
    version,
    about = "Index gzipped PubMed XML archives into OpenSearch"
)]
struct Cli {
    /// Directory containing `*.xml.gz` archives.
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Directory that indexed archives are moved into.
    #[arg(long)]
    processed_dir: Option<PathBuf>,
    /// Target index name.
    #[arg(long)]
    index: Option<String>,
    /// Number of archives processed concurrently.
    #[arg(long)]
    workers: Option<usize>,
    /// Records per bulk request.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Skip the index existence check and creation at startup.
    #[arg(long)]
    skip_index_setup: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.source_dir {
            config.source_dir = dir;
        }
        if let Some(dir) = self.processed_dir {
            config.processed_dir = dir;
        }
        if let Some(index) = self.index {
            config.index_name = index;
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing();

    let skip_index_setup = cli.skip_index_setup;
    let mut config = Config::from_env().context("Failed to load config from environment")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    tracing::debug!(
        url = %config.opensearch_url(),
        index = %config.index_name,
        source = %config.source_dir.display(),
        workers = config.worker_count,
        batch_size = config.batch_size,
        "Loaded configuration"
    );

    let client = OpenSearchService::new(&config).context("Failed to build OpenSearch client")?;
    let coordinator = processing::IndexCoordinator::new(Arc::new(client), &config);

    if !skip_index_setup {
        coordinator.prepare_index().await;
    }

    coordinator
        .run()
        .await
        .context("Indexing run could not start")?;
    Ok(())
}
