//! Workbench configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the configuration database (recent files live here)
    pub database_path: PathBuf,
    /// Maximum number of recent files kept
    pub mru_capacity: usize,
    /// Extension of current-format simulation documents
    pub document_extension: String,
    /// Extension of legacy files that must be imported first
    pub legacy_extension: String,
    /// Extension of startup scripts passed on the command line
    pub script_extension: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("cropdesk.db"),
            mru_capacity: cropdesk_recent::DEFAULT_CAPACITY,
            document_extension: "sim".to_string(),
            legacy_extension: "legacy".to_string(),
            script_extension: "script".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Cropdesk"))
            .unwrap_or_else(|| PathBuf::from(".cropdesk"))
    }

    /// Default location of the JSON config file
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Read the config file at `path`, or fall back to defaults if it does not
    /// exist. A file that exists but cannot be parsed is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(CoreError::file_system("read", path, e)),
        };

        let config: Config = serde_json::from_str(&text)?;
        if config.mru_capacity == 0 {
            return Err(CoreError::Config(
                "mru_capacity must be at least 1".to_string(),
            ));
        }

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::file_system("create", parent, e))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| CoreError::file_system("write", path, e))
    }

    /// True if `path` carries `extension` (case-insensitive, no leading dot)
    pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Per-user data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
