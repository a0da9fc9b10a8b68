use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use steeple::ingest::{self, CategoryFilter};
use steeple::{config, db};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Import places of worship from an Overpass API JSON export"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Overpass JSON export to import
    #[arg(default_value = "data.json")]
    file: PathBuf,

    /// Only import nodes whose amenity tag matches
    #[arg(long, default_value = "place_of_worship")]
    amenity: String,

    /// Only import nodes whose religion tag matches
    #[arg(long, default_value = "christian")]
    religion: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let dump = ingest::parse_dump(&raw)?;
    let filter = CategoryFilter {
        amenity: args.amenity,
        religion: args.religion,
    };

    info!(file = %args.file.display(), "importing overpass export");
    let report = ingest::import_dump(&pool, &dump, &filter).await?;
    info!(
        added = report.added,
        skipped = report.skipped,
        "import finished"
    );

    Ok(())
}
