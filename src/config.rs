use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub legalkg: LegalKgConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Paths and logging
#[derive(Debug, Clone, Deserialize)]
pub struct LegalKgConfig {
    /// Root of the grouping/document folder tree to ingest.
    pub data_folder: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Directory walk settings
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    #[serde(default = "default_grouping_prefix")]
    pub grouping_prefix: String,
    #[serde(default = "default_document_prefix")]
    pub document_prefix: String,
    /// Lowercase extensions without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Visit directory entries in name order instead of filesystem order.
    #[serde(default)]
    pub sort_entries: bool,
    /// Skip a file whose graph writes fail instead of aborting the run.
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            grouping_prefix: default_grouping_prefix(),
            document_prefix: default_document_prefix(),
            extensions: default_extensions(),
            sort_entries: false,
            continue_on_error: default_continue_on_error(),
        }
    }
}

/// Graph store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    #[serde(default = "default_connect_delay_secs")]
    pub connect_delay_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connect_attempts: default_connect_attempts(),
            connect_delay_secs: default_connect_delay_secs(),
        }
    }
}

/// Structural parser settings
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Substrings that mark the signature block; parsing of a document stops at
    /// the first line containing any of them. Markers are plain text, not
    /// regular expressions: `TM.` matches only a literal `TM.`.
    #[serde(default = "default_signature_markers")]
    pub signature_markers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            signature_markers: default_signature_markers(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_grouping_prefix() -> String {
    "demuc".to_string()
}

fn default_document_prefix() -> String {
    "vanban".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["docx".to_string()]
}

fn default_continue_on_error() -> bool {
    true
}

fn default_connect_attempts() -> u32 {
    7
}

fn default_connect_delay_secs() -> u64 {
    10
}

pub fn default_signature_markers() -> Vec<String> {
    [
        "Nơi nhận:",
        "TM.",
        "KT.",
        "CHỦ TỊCH",
        "BỘ TRƯỞNG",
        "GIÁM ĐỐC",
        "THỦ TRƯỞNG",
        "TỔNG GIÁM ĐỐC",
        "TRƯỞNG BAN",
        "CHÁNH VĂN PHÒNG",
        "XÁC NHẬN",
        "PHÊ DUYỆT",
        "QUYẾT ĐỊNH",
        "THÔNG QUA",
        "ĐỒNG Ý",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LEGALKG_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("LEGALKG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text without touching the filesystem or validating paths
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.legalkg.data_folder.exists() {
            anyhow::bail!(
                "data_folder path does not exist: {}. Set data_folder in config.toml to your documents directory.",
                self.legalkg.data_folder.display()
            );
        }

        if !self.legalkg.data_folder.is_dir() {
            anyhow::bail!(
                "data_folder must be a directory, not a file: {}",
                self.legalkg.data_folder.display()
            );
        }

        let traversal = &self.traversal;
        if traversal.grouping_prefix.is_empty() || traversal.document_prefix.is_empty() {
            anyhow::bail!("traversal.grouping_prefix and traversal.document_prefix must not be empty");
        }

        if traversal.grouping_prefix == traversal.document_prefix {
            anyhow::bail!(
                "traversal.grouping_prefix and traversal.document_prefix must differ (both are {:?})",
                traversal.grouping_prefix
            );
        }

        if traversal.extensions.is_empty() {
            anyhow::bail!("traversal.extensions must list at least one extension");
        }

        if self.store.connect_attempts == 0 {
            anyhow::bail!("store.connect_attempts must be greater than 0");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.legalkg.db_path
    }

    /// Get the root of the folder tree to ingest
    pub fn data_folder(&self) -> &Path {
        &self.legalkg.data_folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config(temp_dir: &TempDir) -> String {
        let data_folder = temp_dir.path().canonicalize().unwrap();
        let data_folder_str = data_folder.to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[legalkg]
data_folder = "{}"
db_path = "./test.db"
log_level = "debug"

[traversal]
sort_entries = true
"#,
            data_folder_str
        )
    }

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original_config = std::env::var("LEGALKG_CONFIG").ok();
        std::env::set_var("LEGALKG_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("LEGALKG_CONFIG");
        if let Some(val) = original_config {
            std::env::set_var("LEGALKG_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(&temp_dir)).unwrap();
        let config_path = config_path.canonicalize().unwrap();
        let _cwd = CwdGuard(std::env::current_dir().unwrap());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.legalkg.log_level, "debug");
            assert!(config.traversal.sort_entries);
            // Unspecified sections fall back to defaults
            assert_eq!(config.traversal.grouping_prefix, "demuc");
            assert_eq!(config.store.connect_attempts, 7);
            assert_eq!(config.store.connect_delay_secs, 10);
        });
    }

    #[test]
    fn test_defaults_match_signature_markers() {
        let config = Config::from_toml_str(
            r#"
[legalkg]
data_folder = "data"
db_path = "kg.db"
"#,
        )
        .unwrap();
        assert_eq!(config.legalkg.log_level, "info");
        assert_eq!(config.traversal.document_prefix, "vanban");
        assert_eq!(config.traversal.extensions, vec!["docx".to_string()]);
        assert!(config.traversal.continue_on_error);
        assert_eq!(config.parser.signature_markers.len(), 15);
        assert!(config.parser.signature_markers.iter().any(|m| m == "Nơi nhận:"));
    }

    #[test]
    fn test_validate_rejects_missing_data_folder() {
        let config = Config::from_toml_str(
            r#"
[legalkg]
data_folder = "/definitely/not/here"
db_path = "kg.db"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("data_folder path does not exist"));
    }

    #[test]
    fn test_validate_rejects_equal_prefixes() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::from_toml_str(&create_test_config(&temp_dir)).unwrap();
        config.traversal.document_prefix = config.traversal.grouping_prefix.clone();
        assert!(config.validate().is_err());

        config.traversal.document_prefix = "vanban".to_string();
        config.store.connect_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("LEGALKG_CONFIG").ok();
        std::env::set_var("LEGALKG_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("LEGALKG_CONFIG");
        if let Some(v) = original {
            std::env::set_var("LEGALKG_CONFIG", v);
        }
    }
}
