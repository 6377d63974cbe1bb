//! Settings file loading.
//!
//! Settings come from `intake.toml` in the working directory (or the file
//! given with `--config`). A missing default file means defaults; a missing
//! explicit file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use intake_import::DEFAULT_MAX_UPLOAD_BYTES;
use intake_ingest::IngestOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Settings file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "intake.toml";

/// Environment variable overriding `database_path`.
pub const DB_PATH_ENV_VAR: &str = "INTAKE_DB_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file. Its directory is created on first use.
    pub database_path: PathBuf,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Parsing and mapping options.
    pub import: IngestOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("app.db"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            import: IngestOptions::default(),
        }
    }
}

impl Settings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Replaces the database path when an override is given.
    #[must_use]
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.import.delimiter_bytes().is_empty() {
            bail!("import.delimiters must contain at least one ASCII character");
        }
        if self.import.max_rows == 0 {
            bail!("import.max_rows must be greater than zero");
        }
        if self.max_upload_bytes == 0 {
            bail!("max_upload_bytes must be greater than zero");
        }
        Ok(())
    }
}

/// Loads settings from `explicit`, or from [`CONFIG_FILENAME`] when absent.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = explicit.map_or_else(|| PathBuf::from(CONFIG_FILENAME), Path::to_path_buf);

    match fs::read_to_string(&path) {
        Ok(content) => {
            let settings = Settings::from_toml_str(&content)
                .with_context(|| format!("invalid settings file {}", path.display()))?;
            info!(path = %path.display(), "Loaded settings");
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            debug!(path = %path.display(), "No settings file found, using defaults");
            Ok(Settings::default())
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to read settings file {}", path.display()))
        }
    }
}
