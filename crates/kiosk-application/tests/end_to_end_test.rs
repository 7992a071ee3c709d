//! Wires the real adapters together: file store, HTTP client, services.

mod common;

use std::sync::Arc;

use common::RecordingChatView;
use kiosk_application::{ConversationService, SubmitOutcome};
use kiosk_core::config::ApiConfig;
use kiosk_core::conversation::Message;
use kiosk_core::storage::{Hydration, KeyValueStore, keys};
use kiosk_infrastructure::{FileKeyValueStore, KvConversationRepository};
use kiosk_interaction::OpenAiCompatClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn build(server: &MockServer, store: Arc<FileKeyValueStore>) -> ConversationService {
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    let client = Arc::new(OpenAiCompatClient::new(&config, "sk-test").unwrap());
    let repository = Arc::new(KvConversationRepository::new(store));
    ConversationService::new(client, repository)
}

#[tokio::test]
async fn test_server_error_leaves_only_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileKeyValueStore::new(temp_dir.path()));
    let service = build(&server, store.clone());
    let view = Arc::new(RecordingChatView::default());
    service.subscribe(view.clone());

    let outcome = service.submit("hello").await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.status == Some(500)));
    assert_eq!(service.messages(), vec![Message::user("hello")]);
    assert!(!service.is_in_flight());
    assert_eq!(view.count("error:"), 1);
    assert!(store.get(keys::CONVERSATION_HISTORY).unwrap().is_none());
}

#[tokio::test]
async fn test_history_survives_restart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Welcome!" } }]
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileKeyValueStore::new(temp_dir.path()));

    let first = build(&server, store.clone());
    assert_eq!(
        first.submit("Hi").await,
        SubmitOutcome::Replied("Welcome!".to_string())
    );

    let second = build(&server, store);
    assert_eq!(second.hydrate(), Hydration::Loaded(2));
    assert_eq!(
        second.messages(),
        vec![Message::user("Hi"), Message::assistant("Welcome!")]
    );
}
