//! Incremental ingestion: skip files whose content hash matches the ledger.
//!
//! Re-ingesting a file is always safe because every graph write is an upsert;
//! the ledger only avoids redundant extraction and round trips. A file is
//! recorded after all of its units were written, so a crash mid-file leaves
//! it eligible for the next run.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Compute SHA256 hash of file contents
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Load all recorded file paths and their hashes.
pub fn get_existing_hashes(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT file_path, file_hash FROM ingested_files")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut map = HashMap::new();
    for row in rows {
        let (path, hash) = row?;
        map.insert(path, hash);
    }
    Ok(map)
}

/// Whether the ledger already holds this exact file content.
pub fn is_unchanged(existing_hashes: &HashMap<String, String>, relative_path: &str, file_hash: &str) -> bool {
    existing_hashes
        .get(relative_path)
        .is_some_and(|stored| stored == file_hash)
}

/// Record a fully ingested file.
pub fn record_ingested(conn: &Connection, relative_path: &str, file_hash: &str, unit_count: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO ingested_files (file_path, file_hash, unit_count, ingested_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(file_path) DO UPDATE SET
             file_hash = excluded.file_hash,
             unit_count = excluded.unit_count,
             ingested_at = excluded.ingested_at",
        params![relative_path, file_hash, unit_count as i64, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (Connection, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("kg.db")).unwrap();
        migrate::run_migrations(&mut conn).unwrap();
        (conn, temp_dir)
    }

    #[test]
    fn test_compute_file_hash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "test content").unwrap();

        let hash = compute_file_hash(&path).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_file_hash(&path).unwrap());
    }

    #[test]
    fn test_record_and_classify() {
        let (conn, _temp) = setup();

        assert!(get_existing_hashes(&conn).unwrap().is_empty());

        record_ingested(&conn, "demuc1/vanban1/a.docx", "h1", 4).unwrap();
        let hashes = get_existing_hashes(&conn).unwrap();
        assert!(is_unchanged(&hashes, "demuc1/vanban1/a.docx", "h1"));
        assert!(!is_unchanged(&hashes, "demuc1/vanban1/a.docx", "h2"));
        assert!(!is_unchanged(&hashes, "demuc1/vanban1/b.docx", "h1"));
    }

    #[test]
    fn test_record_overwrites_previous_hash() {
        let (conn, _temp) = setup();

        record_ingested(&conn, "a.docx", "h1", 1).unwrap();
        record_ingested(&conn, "a.docx", "h2", 3).unwrap();

        let (hash, units): (String, i64) = conn
            .query_row(
                "SELECT file_hash, unit_count FROM ingested_files WHERE file_path = ?1",
                params!["a.docx"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(hash, "h2");
        assert_eq!(units, 3);
    }
}
