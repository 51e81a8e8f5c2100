use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use crate::error::{Result, LegalKgError};

pub mod migrate;

/// Graph store session factory.
///
/// The pipeline is single-threaded: one long-lived connection is opened at
/// startup and shared by every mutation of the run.
pub struct Db {
    path: PathBuf,
}

impl Db {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open a connection with the store pragmas applied
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;

        // WAL so readers (stats, export) can run next to an ingest
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA temp_store = MEMORY; \
             PRAGMA cache_size = -65536;"
        )?;

        Ok(conn)
    }

    /// Establish the session, retrying with a fixed delay.
    ///
    /// This is the only retry point of the pipeline; mutations issued later on
    /// the returned connection are never retried.
    pub fn connect_with_retry(&self, attempts: u32, delay: Duration) -> Result<Connection> {
        let attempts = attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.open_connection().and_then(|conn| {
                verify_connectivity(&conn)?;
                Ok(conn)
            }) {
                Ok(conn) => {
                    log::info!("Connected to graph store at {}", self.path.display());
                    return Ok(conn);
                }
                Err(e) => {
                    log::warn!(
                        "Graph store connection attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < attempts {
                        thread::sleep(delay);
                    }
                }
            }
        }

        Err(LegalKgError::StoreUnavailable {
            attempts,
            reason: last_error,
        })
    }
}

fn verify_connectivity(conn: &Connection) -> Result<()> {
    let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    if one != 1 {
        return Err(LegalKgError::Config("connectivity check returned an unexpected value".to_string()));
    }
    Ok(())
}
