use thiserror::Error;

/// Main error type for LegalKG
#[derive(Error, Debug)]
pub enum LegalKgError {
    /// Graph store (SQLite) errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Container-format decode failure (zip archive, document XML)
    #[error("Extraction error in {path}: {reason}")]
    Extraction { path: String, reason: String },

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Graph store could not be reached after all connection attempts
    #[error("Graph store unavailable after {attempts} attempt(s): {reason}")]
    StoreUnavailable { attempts: u32, reason: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using LegalKgError
pub type Result<T> = std::result::Result<T, LegalKgError>;
