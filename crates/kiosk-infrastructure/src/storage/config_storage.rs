//! Config file storage.
//!
//! Loads `config.toml`, writing a default file on first run so operators
//! have something to edit.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use kiosk_core::config::KioskConfig;
use kiosk_core::error::{KioskError, Result};

use crate::paths::KioskPaths;

/// Storage for the main configuration file.
///
/// Responsibilities:
/// - Load config.toml, filling unspecified fields with defaults
/// - Create a default config.toml when none exists
///
/// Does NOT:
/// - Read credentials (see `SecretStorage`)
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage for the default location (`~/.config/kiosk/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: KioskPaths::config_file()?,
        })
    }

    /// Creates a storage for a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, creating a default file if it is missing.
    ///
    /// # Returns
    ///
    /// - `Ok(KioskConfig)`: Loaded (or freshly written default) configuration
    /// - `Err(KioskError::Config)`: The file exists but is not valid TOML
    pub fn load_or_create(&self) -> Result<KioskConfig> {
        if !self.path.exists() {
            let config = KioskConfig::default();
            self.save(&config)?;
            tracing::info!(
                "[ConfigStorage] Created default config at {}",
                self.path.display()
            );
            return Ok(config);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(KioskConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            KioskError::config(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Writes the configuration atomically (tmp file + rename).
    pub fn save(&self, config: &KioskConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
