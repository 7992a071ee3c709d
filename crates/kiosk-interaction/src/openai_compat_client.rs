//! OpenAiCompatClient - REST client for OpenAI-compatible chat completion APIs.
//!
//! Talks to any endpoint exposing `POST {base}/chat/completions` and
//! `GET {base}/models` (OpenRouter by default). The API key is supplied by the
//! caller; see `kiosk_infrastructure::storage::SecretStorage`.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use kiosk_core::config::ApiConfig;
use kiosk_core::conversation::{CompletionClient, Message};
use kiosk_core::error::{ApiError, KioskError, Result};

/// Completion client for OpenAI-compatible HTTP APIs.
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: RwLock<String>,
    max_tokens: u32,
    temperature: f32,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenAiCompatClient {
    /// Creates a client from the `[api]` configuration section.
    ///
    /// # Returns
    ///
    /// - `Ok(Self)`: Client ready to send requests
    /// - `Err(KioskError::Config)`: The key is blank or the HTTP client could not be built
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(KioskError::config("API key is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KioskError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: RwLock::new(config.model.clone()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Applies the bearer credential and the optional attribution headers.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request.header("Authorization", format!("Bearer {}", self.api_key));
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request = request.header("X-Title", title);
        }
        request
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> std::result::Result<String, ApiError> {
        let request = self
            .client
            .post(self.endpoint("chat/completions"))
            .header("content-type", "application/json")
            .json(body);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| ApiError::transport(format!("Completion request failed: {err}")))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            ApiError::status(status.as_u16(), format!("Failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body_text).map_err(|err| {
            let reason = format!("Failed to parse completion response: {err}");
            ApiError::status(status.as_u16(), reason)
        })?;

        extract_text_response(status, parsed)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, history: &[Message]) -> std::result::Result<String, ApiError> {
        let model = self.current_model();
        let request = ChatCompletionRequest {
            model: &model,
            messages: history
                .iter()
                .map(|message| ChatMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(
            "[OpenAiCompatClient] Sending {} messages to model {}",
            history.len(),
            model
        );
        self.send_request(&request).await
    }

    async fn check_connection(&self) -> bool {
        let request = self.client.get(self.endpoint("models"));
        match self.authorize(request).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("[OpenAiCompatClient] API connection OK");
                true
            }
            Ok(response) => {
                tracing::warn!(
                    "[OpenAiCompatClient] API connection check failed with status {}",
                    response.status()
                );
                false
            }
            Err(err) => {
                tracing::warn!("[OpenAiCompatClient] API connection check failed: {}", err);
                false
            }
        }
    }

    fn current_model(&self) -> String {
        match self.model.read() {
            Ok(model) => model.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_model(&self, model: &str) {
        let mut guard = match self.model.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = model.to_string();
        tracing::info!("[OpenAiCompatClient] Model changed to: {}", model);
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(
    status: StatusCode,
    response: ChatCompletionResponse,
) -> std::result::Result<String, ApiError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ApiError::status(status.as_u16(), "API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> ApiError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    ApiError::status(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: server.uri(),
            referer: Some("https://shop.example".to_string()),
            title: Some("Shop Assistant".to_string()),
            ..ApiConfig::default()
        }
    }

    fn reply(content: &str) -> serde_json::Value {
        json!({
            "id": "gen-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_complete_sends_history_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("HTTP-Referer", "https://shop.example"))
            .and(header("X-Title", "Shop Assistant"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-3.5-turbo",
                "max_tokens": 1000,
                "stream": false,
                "messages": [
                    { "role": "user", "content": "Hi" },
                    { "role": "assistant", "content": "Hello!" },
                    { "role": "user", "content": "Opening hours?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("9 to 5")))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        let history = vec![
            Message::user("Hi"),
            Message::assistant("Hello!"),
            Message::user("Opening hours?"),
        ];

        assert_eq!(client.complete(&history).await.unwrap(), "9 to 5");
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        let err = client.complete(&[Message::user("hello")]).await.unwrap_err();

        assert_eq!(err, ApiError::status(500, "upstream exploded"));
    }

    #[tokio::test]
    async fn test_complete_extracts_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "No auth credentials found", "code": 401 }
            })))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        let err = client.complete(&[Message::user("hello")]).await.unwrap_err();

        assert_eq!(err.status, Some(401));
        assert_eq!(err.body, "No auth credentials found");
    }

    #[tokio::test]
    async fn test_complete_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        let err = client.complete(&[Message::user("hello")]).await.unwrap_err();
        assert_eq!(err.status, Some(200));

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client.complete(&[Message::user("hello")]).await.unwrap_err();
        assert!(err.body.contains("Failed to parse"));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 5,
            ..ApiConfig::default()
        };
        let client = OpenAiCompatClient::new(&config, "sk-test").unwrap();

        let err = client.complete(&[Message::user("hello")]).await.unwrap_err();
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_check_connection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        assert!(client.check_connection().await);

        let rejected = OpenAiCompatClient::new(&config_for(&server), "sk-wrong").unwrap();
        assert!(!rejected.check_connection().await);
    }

    #[tokio::test]
    async fn test_set_model_applies_to_next_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "model": "anthropic/claude-3-haiku" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config_for(&server), "sk-test").unwrap();
        client.set_model("anthropic/claude-3-haiku");

        assert_eq!(client.current_model(), "anthropic/claude-3-haiku");
        assert_eq!(client.complete(&[Message::user("hi")]).await.unwrap(), "ok");
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let err = OpenAiCompatClient::new(&ApiConfig::default(), "  ").err().unwrap();
        assert!(matches!(err, KioskError::Config(_)));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ApiConfig::default()
        };
        let client = OpenAiCompatClient::new(&config, "sk-test").unwrap();
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
