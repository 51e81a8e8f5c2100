use anyhow::{Context, Result};
use clap::Parser;
use legalkg::db::{migrate, Db};
use legalkg::{ingest_data_folder, Config, IngestOptions};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the legal knowledge graph from the data folder (incremental by default)")]
struct Args {
    /// Re-ingest every file, ignoring recorded hashes
    #[arg(short, long)]
    force: bool,

    /// Abort the run at the first file whose graph writes fail
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.legalkg.log_level)
    ).init();

    log::info!("Starting LegalKG ingestion");
    log::info!("Data folder: {}", config.data_folder().display());
    log::info!("Database path: {}", config.db_path().display());

    // Exhausting the connection attempts is fatal for the whole run
    let db = Db::new(config.db_path());
    let mut conn = db
        .connect_with_retry(
            config.store.connect_attempts,
            Duration::from_secs(config.store.connect_delay_secs),
        )
        .context("Cannot reach the graph store")?;
    migrate::run_migrations(&mut conn)?;

    if config.traversal.sort_entries {
        log::info!("Traversal order: sorted by name");
    } else {
        log::info!("Traversal order: filesystem order (not deterministic across platforms)");
    }

    let options = IngestOptions {
        force: args.force,
        continue_on_error: config.traversal.continue_on_error && !args.fail_fast,
    };
    if options.force {
        log::info!("Mode: full re-ingestion (all files)");
    }

    let start = Instant::now();
    let report = ingest_data_folder(&conn, &config, options)?;

    log::info!("=== Ingestion Complete ===");
    log::info!("Files discovered: {}", report.files_discovered);
    log::info!("  Written: {}", report.files_written);
    log::info!("  Unchanged (skipped): {}", report.files_unchanged);
    log::info!("  No result: {}", report.files_without_result);
    log::info!("  Failed: {}", report.files_failed);
    log::info!("Content units written: {}", report.units_written);
    log::info!("Nodes created: {}, edges created: {}", report.nodes_created, report.edges_created);
    log::info!("Time: {:?}", start.elapsed());

    if report.files_failed > 0 {
        log::warn!("Some files failed to ingest. Check logs above for details.");
    }

    Ok(())
}
