use anyhow::Result;
use legalkg::db::Db;
use legalkg::{Config, SqliteGraphStore};

fn main() -> Result<()> {
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.legalkg.log_level)
    ).init();

    let db = Db::new(config.db_path());
    let conn = db.open_connection()?;
    let store = SqliteGraphStore::new(&conn);

    println!("\n=== LegalKG Graph Statistics ===\n");

    let nodes = store.count_nodes_by_label()?;
    if nodes.is_empty() {
        println!("The graph is empty.");
        println!("\nRun `ingest` to build it.");
        return Ok(());
    }

    println!("{:<20} {:>10}", "Node label", "Count");
    println!("{:-<31}", "");
    for (label, count) in &nodes {
        println!("{:<20} {:>10}", label, count);
    }
    println!("{:<20} {:>10}", "total", nodes.iter().map(|(_, c)| c).sum::<i64>());

    println!();
    println!("{:<20} {:>10}", "Relation", "Count");
    println!("{:-<31}", "");
    for (relation, count) in store.count_edges_by_relation()? {
        println!("{:<20} {:>10}", relation, count);
    }

    let (files, units): (i64, Option<i64>) = conn.query_row(
        "SELECT COUNT(*), SUM(unit_count) FROM ingested_files",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!("\nIngested files: {} ({} content units)", files, units.unwrap_or(0));

    Ok(())
}
