use std::path::Path;

use super::Loader;
use crate::error::Result;

/// Already-extracted UTF-8 text, passed through as is.
pub struct PlainTextLoader;

impl Loader for PlainTextLoader {
    fn can_load(&self, extension: &str) -> bool {
        extension == "txt"
    }

    fn load(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}
