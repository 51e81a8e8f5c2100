use anyhow::Result;
use legalkg::db::{migrate, Db};
use legalkg::Config;
use rusqlite::Connection;
use std::time::Duration;

fn main() -> Result<()> {
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.legalkg.log_level)
    ).init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "verify".to_string());
    match command.as_str() {
        "verify" => run_schema_verification(&config),
        other => anyhow::bail!("Unknown command: {} (expected: verify)", other),
    }
}

/// Open the store, apply migrations and check the resulting schema
fn run_schema_verification(config: &Config) -> Result<()> {
    log::info!("Starting LegalKG v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Data folder: {}", config.data_folder().display());
    log::info!("Database path: {}", config.db_path().display());

    let db = Db::new(config.db_path());
    let mut conn = db.connect_with_retry(
        config.store.connect_attempts,
        Duration::from_secs(config.store.connect_delay_secs),
    )?;
    migrate::run_migrations(&mut conn)?;
    log::info!("Database initialized successfully");

    verify_database_schema(&conn)?;

    log::info!("✓ Database schema verification complete");
    Ok(())
}

/// Verify that all expected database objects exist
fn verify_database_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let expected_tables = ["edges", "ingested_files", "nodes", "schema_migrations"];
    let missing: Vec<_> = expected_tables
        .iter()
        .filter(|table| !tables.iter().any(|t| t == *table))
        .collect();
    for table in &missing {
        log::error!("Missing table: {}", table);
    }
    if !missing.is_empty() {
        anyhow::bail!("Not all required tables exist");
    }
    log::debug!("✓ Tables exist: {}", expected_tables.join(", "));

    let applied = migrate::get_applied_migrations(conn)?;
    if applied.len() < migrate::expected_migration_count() {
        anyhow::bail!(
            "Expected {} migrations, found {}",
            migrate::expected_migration_count(),
            applied.len()
        );
    }
    log::debug!("✓ {} migrations applied", applied.len());

    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    if !journal_mode.eq_ignore_ascii_case("wal") {
        anyhow::bail!("Journal mode is not WAL: {}", journal_mode);
    }
    log::debug!("✓ Journal mode: WAL");

    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        anyhow::bail!("Foreign keys not enabled");
    }
    log::debug!("✓ Foreign keys enabled");

    let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if integrity != "ok" {
        anyhow::bail!("Database integrity check failed: {}", integrity);
    }
    log::info!("✓ Database integrity: OK");

    Ok(())
}
