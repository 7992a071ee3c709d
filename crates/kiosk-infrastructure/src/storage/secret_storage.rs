//! Secret configuration file storage.
//!
//! The API key is read from `~/.config/kiosk/secret.json` or from the
//! `KIOSK_API_KEY` environment variable, which takes precedence. It is never
//! compiled in and never written back by the application.

use std::fs;
use std::path::{Path, PathBuf};

use kiosk_core::config::SecretConfig;
use kiosk_core::error::{KioskError, Result};

use crate::paths::KioskPaths;

/// Environment variable that overrides `secret.json`.
pub const API_KEY_ENV: &str = "KIOSK_API_KEY";

/// Storage for secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json from ~/.config/kiosk/
/// - Resolve the effective API key with the environment override
///
/// Does NOT:
/// - Write or modify secret files (read-only)
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a storage for the default location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: KioskPaths::secret_file()?,
        })
    }

    /// Creates a storage for a custom path (useful for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads secret.json.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SecretConfig))`: File exists and parsed
    /// - `Ok(None)`: File does not exist
    /// - `Err(KioskError::Config)`: File exists but is not valid JSON
    pub fn load(&self) -> Result<Option<SecretConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let secret = serde_json::from_str(&content)
            .map_err(|e| KioskError::config(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(secret))
    }

    /// Resolves the API key from the process environment and secret.json.
    pub fn api_key(&self) -> Result<Option<String>> {
        self.api_key_with_env(|name| std::env::var(name).ok())
    }

    /// Resolves the API key using the given environment lookup.
    ///
    /// A non-blank `KIOSK_API_KEY` wins over the file. Blank values count as
    /// unset.
    pub fn api_key_with_env<F>(&self, env: F) -> Result<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = env(API_KEY_ENV).and_then(non_blank) {
            tracing::debug!("[SecretStorage] Using API key from {}", API_KEY_ENV);
            return Ok(Some(key));
        }

        Ok(self.load()?.and_then(|secret| secret.api_key).and_then(non_blank))
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
