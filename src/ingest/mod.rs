pub mod document_number;
pub mod folders;
pub mod incremental;
pub mod loader;
pub mod split;
pub mod structure;
pub mod unit;
pub mod walker;

pub use folders::{FolderContext, FolderKeys, FolderNaming};
pub use incremental::{compute_file_hash, get_existing_hashes, record_ingested};
pub use loader::{LoadOutcome, LoaderRegistry, SkipReason};
pub use structure::StructureParser;
pub use unit::{ContentUnit, Hierarchy, HierarchyLevel};
pub use walker::{discover_files, DiscoveredFile};

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::graph::{GraphWriter, SqliteGraphStore, WriteSummary};

/// Per-run switches for [`ingest_files`].
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Re-ingest files whose hash is already in the ledger
    pub force: bool,
    /// Log a failed file and move on instead of aborting the run
    pub continue_on_error: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            force: false,
            continue_on_error: true,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written { units: usize, summary: WriteSummary },
    Unchanged,
    NoResult(SkipReason),
}

/// Counters for a whole traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalReport {
    pub files_discovered: usize,
    pub files_written: usize,
    pub files_unchanged: usize,
    pub files_without_result: usize,
    pub files_failed: usize,
    pub units_written: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
}

/// Shared collaborators for ingesting files of one data tree.
pub struct Pipeline {
    pub loaders: LoaderRegistry,
    pub parser: StructureParser,
    pub naming: FolderNaming,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            loaders: LoaderRegistry::new(),
            parser: StructureParser::from_config(&config.parser),
            naming: FolderNaming::from_config(&config.traversal)?,
        })
    }

    /// Load and parse one file without touching the graph.
    pub fn parse_file(&self, path: &std::path::Path) -> std::result::Result<Vec<ContentUnit>, SkipReason> {
        match self.loaders.load(path) {
            LoadOutcome::Loaded(text) => {
                let units = self.parser.parse(&text);
                if units.is_empty() {
                    Err(SkipReason::NoContent)
                } else {
                    Ok(units)
                }
            }
            LoadOutcome::Skipped(reason) => Err(reason),
        }
    }
}

/// Ingest one discovered file: load, parse, write every unit in order, then record it.
///
/// Skips (missing, unsupported, undecodable or article-less files) are
/// returned as [`FileOutcome::NoResult`] and leave no ledger entry. A store
/// error aborts the file; units written before it stay in the graph.
pub fn ingest_file(
    conn: &Connection,
    file: &DiscoveredFile,
    pipeline: &Pipeline,
    existing_hashes: &HashMap<String, String>,
    force: bool,
) -> Result<FileOutcome> {
    if !file.absolute_path.is_file() {
        return Ok(FileOutcome::NoResult(SkipReason::Missing));
    }

    let file_hash = compute_file_hash(&file.absolute_path)?;
    if !force && incremental::is_unchanged(existing_hashes, &file.relative_path, &file_hash) {
        log::debug!("Unchanged since last ingest: {}", file.relative_path);
        return Ok(FileOutcome::Unchanged);
    }

    let units = match pipeline.parse_file(&file.absolute_path) {
        Ok(units) => units,
        Err(reason) => return Ok(FileOutcome::NoResult(reason)),
    };

    let keys = file.context.keys(&pipeline.naming);
    let mut writer = GraphWriter::new(SqliteGraphStore::new(conn));
    let mut summary = WriteSummary::default();
    for unit in &units {
        summary += writer.add_unit(unit, &keys)?;
    }

    record_ingested(conn, &file.relative_path, &file_hash, units.len())?;

    Ok(FileOutcome::Written {
        units: units.len(),
        summary,
    })
}

/// Ingest files in the given order, applying the per-file error policy.
pub fn ingest_files(
    conn: &Connection,
    files: &[DiscoveredFile],
    pipeline: &Pipeline,
    options: IngestOptions,
) -> Result<TraversalReport> {
    let existing_hashes = get_existing_hashes(conn)?;
    let mut report = TraversalReport {
        files_discovered: files.len(),
        ..TraversalReport::default()
    };

    for file in files {
        log::info!("Processing {} [{}]", file.relative_path, file.context);

        match ingest_file(conn, file, pipeline, &existing_hashes, options.force) {
            Ok(FileOutcome::Written { units, summary }) => {
                log::info!(
                    "  {} units, {} new nodes, {} new edges",
                    units,
                    summary.nodes_created,
                    summary.edges_created
                );
                report.files_written += 1;
                report.units_written += units;
                report.nodes_created += summary.nodes_created;
                report.edges_created += summary.edges_created;
            }
            Ok(FileOutcome::Unchanged) => report.files_unchanged += 1,
            Ok(FileOutcome::NoResult(reason)) => {
                log::warn!("No result for {}: {}", file.relative_path, reason);
                report.files_without_result += 1;
            }
            Err(e) => {
                log::warn!("Failed to ingest {}: {}", file.relative_path, e);
                report.files_failed += 1;
                if !options.continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    Ok(report)
}

/// Discover and ingest every document under the configured data folder.
pub fn ingest_data_folder(conn: &Connection, config: &Config, options: IngestOptions) -> Result<TraversalReport> {
    let pipeline = Pipeline::from_config(config)?;
    let files = discover_files(
        config.data_folder(),
        &pipeline.naming,
        &config.traversal.extensions,
        config.traversal.sort_entries,
    )?;
    ingest_files(conn, &files, &pipeline, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::graph::{NodeLabel, NodeRef};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CIRCULAR: &str = "BỘ KHOA HỌC VÀ CÔNG NGHỆ\n\
        Số: 12/2020/TT-BKHCN\n\
        Chương I\n\
        Điều 1. Phạm vi điều chỉnh\n\
        1. Thông tư này quy định. 2. Áp dụng thống nhất.\n\
        Điều 2. Đối tượng áp dụng\n\
        Cơ quan nhà nước.\n\
        Nơi nhận:\n\
        - Như Điều 2;\n";

    fn config_for(data: &Path, db: &Path) -> Config {
        let toml = format!(
            "[legalkg]\ndata_folder = {:?}\ndb_path = {:?}\n\n[traversal]\nextensions = [\"txt\"]\nsort_entries = true\n",
            data.display().to_string(),
            db.display().to_string()
        );
        Config::from_toml_str(&toml).unwrap()
    }

    fn setup() -> (TempDir, Config, Connection) {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir_all(data.join("demuc1/vanban1")).unwrap();
        fs::create_dir_all(data.join("demuc2")).unwrap();
        fs::write(data.join("demuc1/vanban1/thongtu.txt"), CIRCULAR).unwrap();
        fs::write(
            data.join("demuc2/ghichu.txt"),
            "Số: 3/2021/QĐ-UBND\nĐiều 1. Hiệu lực\nQuyết định có hiệu lực.\n",
        )
        .unwrap();
        fs::write(data.join("demuc1/vanban1/trong.txt"), "Không có điều khoản nào.\n").unwrap();

        let db_path = temp_dir.path().join("kg.db");
        let config = config_for(&data, &db_path);
        let mut conn = Connection::open(&db_path).unwrap();
        migrate::run_migrations(&mut conn).unwrap();
        (temp_dir, config, conn)
    }

    fn counts(conn: &Connection) -> (i64, i64) {
        let nodes = conn.query_row("SELECT COUNT(*) FROM nodes", [], |r| r.get(0)).unwrap();
        let edges = conn.query_row("SELECT COUNT(*) FROM edges", [], |r| r.get(0)).unwrap();
        (nodes, edges)
    }

    #[test]
    fn test_ingest_data_folder() {
        let (_temp, config, conn) = setup();

        let report = ingest_data_folder(&conn, &config, IngestOptions::default()).unwrap();
        assert_eq!(report.files_discovered, 3);
        assert_eq!(report.files_written, 2);
        assert_eq!(report.files_without_result, 1);
        assert_eq!(report.files_failed, 0);
        // Điều 1 splits into 1.1 and 1.2
        assert_eq!(report.units_written, 4);

        let store = SqliteGraphStore::new(&conn);
        let doc_number = Some("12/2020/TT-BKHCN");
        assert!(store.find_node(&NodeRef::document(1, doc_number)).unwrap().is_some());
        assert!(store
            .find_node(&NodeRef::level(HierarchyLevel::Chapter, "Chương I", doc_number))
            .unwrap()
            .is_some());

        // No document folder above demuc2/ghichu.txt
        let grouping2 = store.find_node(&NodeRef::grouping(2)).unwrap().unwrap();
        assert!(store.outgoing(grouping2, None).unwrap().is_empty());
        assert_eq!(store.nodes(Some(NodeLabel::Document)).unwrap().len(), 1);
    }

    #[test]
    fn test_rerun_skips_unchanged_and_force_is_idempotent() {
        let (_temp, config, conn) = setup();

        ingest_data_folder(&conn, &config, IngestOptions::default()).unwrap();
        let after_first = counts(&conn);

        let second = ingest_data_folder(&conn, &config, IngestOptions::default()).unwrap();
        assert_eq!(second.files_unchanged, 2);
        assert_eq!(second.files_written, 0);
        // The article-less file is never recorded, so it is retried
        assert_eq!(second.files_without_result, 1);

        let forced = IngestOptions { force: true, ..IngestOptions::default() };
        let third = ingest_data_folder(&conn, &config, forced).unwrap();
        assert_eq!(third.files_written, 2);
        assert_eq!(third.nodes_created, 0);
        assert_eq!(third.edges_created, 0);
        assert_eq!(counts(&conn), after_first);
    }

    #[test]
    fn test_store_failure_policy() {
        let (_temp, config, conn) = setup();
        conn.execute_batch("DROP TABLE edges;").unwrap();

        // demuc2/ghichu.txt has no document folder and no headings, so it needs no edge
        let report = ingest_data_folder(&conn, &config, IngestOptions::default()).unwrap();
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_written, 1);
        let ledger = get_existing_hashes(&conn).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains_key("demuc2/ghichu.txt"));

        let fail_fast = IngestOptions { force: false, continue_on_error: false };
        assert!(ingest_data_folder(&conn, &config, fail_fast).is_err());
    }

    #[test]
    fn test_parse_file_outcomes() {
        let (temp, config, _conn) = setup();
        let pipeline = Pipeline::from_config(&config).unwrap();
        let data = temp.path().join("data");

        let units = pipeline.parse_file(&data.join("demuc1/vanban1/thongtu.txt")).unwrap();
        let numbers: Vec<_> = units.iter().map(|u| u.article_number.as_str()).collect();
        assert_eq!(numbers, vec!["1.1", "1.2", "2"]);
        assert_eq!(units[2].body, "Cơ quan nhà nước.");

        assert_eq!(
            pipeline.parse_file(&data.join("demuc1/vanban1/trong.txt")),
            Err(SkipReason::NoContent)
        );
        assert_eq!(pipeline.parse_file(&data.join("nope.txt")), Err(SkipReason::Missing));

        let pdf = data.join("scan.pdf");
        fs::write(&pdf, b"%PDF").unwrap();
        assert_eq!(
            pipeline.parse_file(&pdf),
            Err(SkipReason::Unsupported("pdf".to_string()))
        );
    }
}
