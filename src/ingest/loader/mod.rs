pub mod docx;
pub mod plaintext;

use std::path::Path;

use crate::error::Result;

/// Why a file produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Unsupported(String),
    Extraction(String),
    /// Text was extracted but no article was found in it
    NoContent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "file not found"),
            Self::Unsupported(extension) => write!(f, "unsupported file format: .{}", extension),
            Self::Extraction(reason) => write!(f, "extraction failed: {}", reason),
            Self::NoContent => write!(f, "no articles found"),
        }
    }
}

/// Result of loading one file: its plain text, or a non-fatal skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(String),
    Skipped(SkipReason),
}

/// Extracts the plain text stream of one container format
pub trait Loader {
    /// Check if this loader can handle the given (lowercase) file extension
    fn can_load(&self, extension: &str) -> bool;

    /// Read the file and return its text, one paragraph per line
    fn load(&self, path: &Path) -> Result<String>;
}

/// Loader registry that selects the loader by extension
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
}

impl LoaderRegistry {
    /// Create a registry with the built-in loaders
    pub fn new() -> Self {
        let mut registry = Self {
            loaders: Vec::new(),
        };

        registry.register(Box::new(docx::DocxLoader));
        registry.register(Box::new(plaintext::PlainTextLoader));

        registry
    }

    pub fn register(&mut self, loader: Box<dyn Loader>) {
        self.loaders.push(loader);
    }

    pub fn find_loader(&self, extension: &str) -> Option<&dyn Loader> {
        self.loaders
            .iter()
            .find(|l| l.can_load(extension))
            .map(|l| l.as_ref())
    }

    /// Load a file's text.
    ///
    /// Missing files, unknown extensions and decode failures are reported as
    /// [`LoadOutcome::Skipped`] so a caller walking many files can move on.
    pub fn load(&self, path: &Path) -> LoadOutcome {
        if !path.is_file() {
            log::warn!("File not found: {}", path.display());
            return LoadOutcome::Skipped(SkipReason::Missing);
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        let Some(loader) = self.find_loader(&extension) else {
            log::warn!("Unsupported file format: .{} ({})", extension, path.display());
            return LoadOutcome::Skipped(SkipReason::Unsupported(extension));
        };

        match loader.load(path) {
            Ok(text) => LoadOutcome::Loaded(text),
            Err(e) => {
                log::warn!("Error processing document {}: {}", path.display(), e);
                LoadOutcome::Skipped(SkipReason::Extraction(e.to_string()))
            }
        }
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
