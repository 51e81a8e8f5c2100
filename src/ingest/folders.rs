//! Folder naming convention of the data tree.
//!
//! ```text
//! data/
//!   chude19/              (ignored tier)
//!     demuc1/             grouping folder: <grouping_prefix><digits>
//!       vanban30/         document folder: <document_prefix><digits>
//!         thongtu.docx
//! ```

use regex::Regex;
use serde::Serialize;

use crate::config::TraversalConfig;
use crate::error::{LegalKgError, Result};

/// What a folder name means for the traversal context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Grouping,
    Document,
    Other,
}

/// Prefix-based folder classification plus numeral extraction
#[derive(Debug, Clone)]
pub struct FolderNaming {
    grouping_prefix: String,
    document_prefix: String,
    grouping_number: Regex,
    document_number: Regex,
}

impl FolderNaming {
    pub fn new(grouping_prefix: &str, document_prefix: &str) -> Result<Self> {
        let numbered = |prefix: &str| {
            Regex::new(&format!(r"^{}(\d+)$", regex::escape(prefix)))
                .map_err(|e| LegalKgError::Config(format!("invalid folder prefix {:?}: {}", prefix, e)))
        };

        Ok(Self {
            grouping_prefix: grouping_prefix.to_string(),
            document_prefix: document_prefix.to_string(),
            grouping_number: numbered(grouping_prefix)?,
            document_number: numbered(document_prefix)?,
        })
    }

    pub fn from_config(config: &TraversalConfig) -> Result<Self> {
        Self::new(&config.grouping_prefix, &config.document_prefix)
    }

    /// Grouping wins when a name carries both prefixes.
    pub fn classify(&self, folder_name: &str) -> FolderKind {
        if folder_name.starts_with(&self.grouping_prefix) {
            FolderKind::Grouping
        } else if folder_name.starts_with(&self.document_prefix) {
            FolderKind::Document
        } else {
            FolderKind::Other
        }
    }

    /// `demuc12` → `Some(12)`; a grouping name without a clean numeral → `None`.
    pub fn grouping_id(&self, folder_name: &str) -> Option<i64> {
        extract_number(&self.grouping_number, folder_name)
    }

    pub fn document_id(&self, folder_name: &str) -> Option<i64> {
        extract_number(&self.document_number, folder_name)
    }
}

fn extract_number(pattern: &Regex, folder_name: &str) -> Option<i64> {
    pattern
        .captures(folder_name)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Grouping and document folders enclosing a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderContext {
    pub grouping: Option<String>,
    pub document: Option<String>,
}

impl FolderContext {
    /// Context inside `folder_name`, given this context outside it.
    ///
    /// Entering a grouping folder clears the document folder.
    pub fn enter(&self, folder_name: &str, naming: &FolderNaming) -> Self {
        match naming.classify(folder_name) {
            FolderKind::Grouping => {
                log::info!("Entering grouping: {}", folder_name);
                Self {
                    grouping: Some(folder_name.to_string()),
                    document: None,
                }
            }
            FolderKind::Document => {
                log::info!("  Current document folder: {}", folder_name);
                Self {
                    grouping: self.grouping.clone(),
                    document: Some(folder_name.to_string()),
                }
            }
            FolderKind::Other => self.clone(),
        }
    }

    pub fn keys(&self, naming: &FolderNaming) -> FolderKeys {
        FolderKeys {
            grouping_id: self.grouping.as_deref().and_then(|name| naming.grouping_id(name)),
            document_id: self.document.as_deref().and_then(|name| naming.document_id(name)),
        }
    }
}

impl std::fmt::Display for FolderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            self.grouping.as_deref().unwrap_or("-"),
            self.document.as_deref().unwrap_or("-")
        )
    }
}

/// Numeric folder identifiers handed to the graph writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderKeys {
    pub grouping_id: Option<i64>,
    pub document_id: Option<i64>,
}
