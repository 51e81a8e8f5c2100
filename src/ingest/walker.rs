use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use crate::error::{LegalKgError, Result};
use super::folders::{FolderContext, FolderNaming};

/// A document file found under the data folder, with its folder context
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub extension: String,
    pub context: FolderContext,
}

/// Walk the data tree depth-first and collect document files in visit order.
///
/// Each directory's context is derived from its parent's context and its own
/// name (see [`FolderContext::enter`]); sibling subtrees never see each
/// other's context. Files whose lowercase extension is not in `extensions`
/// are skipped silently.
///
/// Without `sort_entries`, entries come in the order the filesystem lists
/// them, which differs between platforms and filesystems. Pass
/// `sort_entries = true` for a deterministic, name-sorted walk.
pub fn discover_files(
    root: &Path,
    naming: &FolderNaming,
    extensions: &[String],
    sort_entries: bool,
) -> Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(LegalKgError::InvalidInput(format!(
            "data folder is not a directory: {}",
            root.display()
        )));
    }

    let mut walker = WalkDir::new(root).follow_links(true);
    if sort_entries {
        walker = walker.sort_by_file_name();
    }

    // contexts[d] is the context inside the directory currently open at depth d
    let mut contexts: Vec<FolderContext> = Vec::new();
    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let depth = entry.depth();

        if entry.file_type().is_dir() {
            contexts.truncate(depth);
            let outer = contexts.last().cloned().unwrap_or_default();
            contexts.push(outer.enter(&entry.file_name().to_string_lossy(), naming));
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&extension)) {
            log::debug!("Skipping non-document file: {}", path.display());
            continue;
        }

        let context = depth
            .checked_sub(1)
            .and_then(|parent_depth| contexts.get(parent_depth))
            .cloned()
            .unwrap_or_default();

        let relative_path = path
            .strip_prefix(root)
            .map_err(|_| LegalKgError::Config(
                format!("Failed to compute relative path for: {}", path.display())
            ))?
            .to_string_lossy()
            .replace('\\', "/");

        files.push(DiscoveredFile {
            relative_path,
            absolute_path: path.to_path_buf(),
            extension,
            context,
        });
    }

    log::info!("Discovered {} document files in {}", files.len(), root.display());
    Ok(files)
}
