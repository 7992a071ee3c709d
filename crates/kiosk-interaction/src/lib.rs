//! Adapters to external services.

pub mod openai_compat_client;

pub use openai_compat_client::OpenAiCompatClient;
