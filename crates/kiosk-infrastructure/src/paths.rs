//! Unified path management for kiosk files.
//!
//! All platform directories are resolved through the `dirs` crate, so the
//! layout follows XDG on Linux and the native conventions elsewhere.

use std::path::PathBuf;

use kiosk_core::error::{KioskError, Result};

const APP_DIR: &str = "kiosk";

/// Unified path management for kiosk.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/kiosk/             # Config directory
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API key (never written by the app)
/// └── logs/                    # Daily rolling logs
///     └── kiosk.log.YYYY-MM-DD
///
/// ~/.local/share/kiosk/        # Data directory
/// └── store/                   # Key-value store, one file per key
///     ├── conversation.history.json
///     ├── cart.items.json
///     ├── cart.transaction_code.json
///     └── cart.transaction_amount.json
/// ```
pub struct KioskPaths;

impl KioskPaths {
    /// Returns the kiosk configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/kiosk/`)
    /// - `Err(KioskError::Config)`: Platform directory could not be determined
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| KioskError::config("Cannot find config directory"))
    }

    /// Returns the kiosk data directory (e.g., `~/.local/share/kiosk/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| KioskError::config("Cannot find data directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Returns the key-value store directory under the given data root.
    pub fn store_dir_in(data_dir: impl Into<PathBuf>) -> PathBuf {
        data_dir.into().join("store")
    }

    /// Returns the default key-value store directory.
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::store_dir_in(Self::data_dir()?))
    }
}
