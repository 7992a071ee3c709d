//! Completion client port.

use async_trait::async_trait;

use super::message::Message;
use crate::error::ApiError;

/// An abstract client for an external chat completion API.
///
/// The conversation engine never talks HTTP itself; `kiosk-interaction`
/// provides the OpenAI-compatible implementation and tests substitute
/// scripted clients.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the ordered history and returns the assistant's reply text.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Reply text from the first choice
    /// - `Err(ApiError)`: Non-success status, malformed body, or no response
    async fn complete(&self, history: &[Message]) -> Result<String, ApiError>;

    /// Checks the API with the configured credential.
    ///
    /// Returns `true` when the API answered with a success status.
    async fn check_connection(&self) -> bool;

    /// Name of the model requests are currently sent to.
    fn current_model(&self) -> String;

    /// Switches the model used for subsequent requests.
    fn set_model(&self, model: &str);
}
