//! Configuration models.
//!
//! `KioskConfig` is read from `config.toml`; credentials live separately in
//! `SecretConfig` and are never written into the main config file.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REDIRECT_DELAY_SECS: u64 = 3;

/// Completion API settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL; `/chat/completions` and `/models` are appended.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Sent as `HTTP-Referer` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Sent as `X-Title` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            referer: None,
            title: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chat front-end settings.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ChatConfig {
    /// Canned prompts offered as quick actions.
    #[serde(default)]
    pub quick_prompts: Vec<String>,
}

/// Checkout settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Where the confirmation view sends the customer afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Delay before the redirect, in seconds.
    pub redirect_delay_secs: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            redirect_url: None,
            redirect_delay_secs: DEFAULT_REDIRECT_DELAY_SECS,
        }
    }
}

/// Storage location override.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Directory for the key-value store. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct KioskConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub cart: CartConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SecretConfig {
    /// Bearer credential for the completion API.
    #[serde(default)]
    pub api_key: Option<String>,
}
