pub mod config;
pub mod error;
pub mod db;
pub mod ingest;
pub mod graph;

pub use config::Config;
pub use error::{LegalKgError, Result};
pub use graph::{GraphStore, GraphWriter, SqliteGraphStore};
pub use ingest::{ingest_data_folder, IngestOptions, StructureParser, TraversalReport};
