use anyhow::{Context, Result};
use clap::Parser;
use legalkg::db::Db;
use legalkg::graph::write_cypher;
use legalkg::{Config, SqliteGraphStore};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export the graph as an idempotent Cypher MERGE script")]
struct Args {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.legalkg.log_level)
    ).init();

    let db = Db::new(config.db_path());
    let conn = db.open_connection()?;
    let store = SqliteGraphStore::new(&conn);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let summary = write_cypher(&store, &mut out)?;
    log::info!("Exported {} nodes and {} edges", summary.nodes, summary.edges);

    Ok(())
}
