//! Wiring of configuration, storage and services for one CLI invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use kiosk_application::{CartService, ConversationService};
use kiosk_core::config::KioskConfig;
use kiosk_core::conversation::CompletionClient;
use kiosk_core::storage::KeyValueStore;
use kiosk_infrastructure::storage::{API_KEY_ENV, ConfigStorage, SecretStorage};
use kiosk_infrastructure::{
    FileKeyValueStore, KioskPaths, KvCartRepository, KvConversationRepository,
    MemoryKeyValueStore, TimeRandomCodeGenerator,
};
use kiosk_interaction::OpenAiCompatClient;

/// Returns `--config` if given, otherwise the platform default.
pub fn resolve_config_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => KioskPaths::config_file().context("Failed to locate config directory"),
    }
}

/// Picks the data root: `--data-dir`, then `[storage] data_dir`, then the
/// platform data directory.
fn resolve_data_root(flag: Option<PathBuf>, config: &KioskConfig) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = &config.storage.data_dir {
        return Ok(PathBuf::from(dir));
    }
    KioskPaths::data_dir().context("Failed to locate data directory")
}

pub struct AppContext {
    pub config: KioskConfig,
    config_path: PathBuf,
    store: Arc<dyn KeyValueStore>,
    store_location: Option<PathBuf>,
}

impl AppContext {
    pub fn load(config_path: PathBuf, data_dir: Option<PathBuf>, ephemeral: bool) -> Result<Self> {
        let config = ConfigStorage::with_path(&config_path)
            .load_or_create()
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let (store, store_location): (Arc<dyn KeyValueStore>, Option<PathBuf>) = if ephemeral {
            (Arc::new(MemoryKeyValueStore::new()), None)
        } else {
            let dir = KioskPaths::store_dir_in(resolve_data_root(data_dir, &config)?);
            (Arc::new(FileKeyValueStore::new(&dir)), Some(dir))
        };

        Ok(Self {
            config,
            config_path,
            store,
            store_location,
        })
    }

    pub fn storage_description(&self) -> String {
        match &self.store_location {
            Some(dir) => dir.display().to_string(),
            None => "in-memory".to_string(),
        }
    }

    /// `secret.json` lives next to the config file.
    fn secret_path(&self) -> PathBuf {
        secret_path_for(&self.config_path)
    }

    pub fn completion_client(&self) -> Result<Arc<dyn CompletionClient>> {
        let secret_path = self.secret_path();
        let api_key = SecretStorage::with_path(&secret_path)
            .api_key()
            .context("Failed to read API key")?
            .ok_or_else(|| {
                anyhow!(
                    "No API key found. Set {} or add \"api_key\" to {}",
                    API_KEY_ENV,
                    secret_path.display()
                )
            })?;

        let client = OpenAiCompatClient::new(&self.config.api, api_key)?;
        Ok(Arc::new(client))
    }

    pub fn conversation_service(&self) -> Result<ConversationService> {
        let client = self.completion_client()?;
        let repository = Arc::new(KvConversationRepository::new(self.store.clone()));
        Ok(ConversationService::new(client, repository)
            .with_quick_prompts(self.config.chat.quick_prompts.clone()))
    }

    pub fn cart_service(&self) -> CartService {
        let repository = Arc::new(KvCartRepository::new(self.store.clone()));
        CartService::new(repository, Arc::new(TimeRandomCodeGenerator::new()))
    }
}

fn secret_path_for(config_path: &Path) -> PathBuf {
    config_path.with_file_name("secret.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_root_priority() {
        let mut config = KioskConfig::default();
        config.storage.data_dir = Some("/srv/kiosk".to_string());

        let flag = resolve_data_root(Some(PathBuf::from("/tmp/override")), &config).unwrap();
        assert_eq!(flag, PathBuf::from("/tmp/override"));

        let configured = resolve_data_root(None, &config).unwrap();
        assert_eq!(configured, PathBuf::from("/srv/kiosk"));
    }

    #[test]
    fn test_secret_sits_next_to_config() {
        assert_eq!(
            secret_path_for(Path::new("/etc/kiosk/config.toml")),
            PathBuf::from("/etc/kiosk/secret.json")
        );
    }

    #[test]
    fn test_load_uses_data_dir_flag() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(
            temp_dir.path().join("config.toml"),
            Some(temp_dir.path().join("data")),
            false,
        )
        .unwrap();

        assert_eq!(
            ctx.storage_description(),
            temp_dir.path().join("data/store").display().to_string()
        );
        assert!(temp_dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_ephemeral_cart_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(temp_dir.path().join("config.toml"), None, true).unwrap();

        assert_eq!(ctx.storage_description(), "in-memory");
        let cart = ctx.cart_service();
        cart.hydrate();
        assert!(cart.items().is_empty());
    }
}
