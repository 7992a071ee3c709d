//! Shared test doubles for the service integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use kiosk_application::{CartView, ChatView};
use kiosk_core::cart::{LineItem, TransactionCodeGenerator, TransactionRecord};
use kiosk_core::conversation::{CompletionClient, Message};
use kiosk_core::error::ApiError;

/// Records every chat view call as a short string.
#[derive(Default)]
pub struct RecordingChatView {
    events: Mutex<Vec<String>>,
}

impl RecordingChatView {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ChatView for RecordingChatView {
    fn show_welcome(&self) {
        self.push("welcome:show".to_string());
    }

    fn hide_welcome(&self) {
        self.push("welcome:hide".to_string());
    }

    fn render_message(&self, message: &Message) {
        self.push(format!("message:{}:{}", message.role.as_str(), message.content));
    }

    fn render_error(&self, text: &str) {
        self.push(format!("error:{}", text));
    }

    fn clear_messages(&self) {
        self.push("clear".to_string());
    }

    fn set_loading(&self, loading: bool) {
        self.push(format!("loading:{}", loading));
    }
}

/// Records every cart view call as a short string.
#[derive(Default)]
pub struct RecordingCartView {
    events: Mutex<Vec<String>>,
}

impl RecordingCartView {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn last(&self, prefix: &str) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find(|event| event.starts_with(prefix))
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl CartView for RecordingCartView {
    fn update_badge(&self, count: u32) {
        self.push(format!("badge:{}", count));
    }

    fn render_items(&self, items: &[LineItem], total: f64) {
        self.push(format!("items:{}:{:.2}", items.len(), total));
    }

    fn show_checkout(&self, record: &TransactionRecord) {
        self.push(format!("checkout:{}:{:.2}", record.code, record.amount));
    }

    fn alert(&self, message: &str) {
        self.push(format!("alert:{}", message));
    }

    fn confirmed(&self, record: &TransactionRecord) {
        self.push(format!("confirmed:{}", record.code));
    }
}

/// Replies from a queue; each call records the history it was given.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
    model: Mutex<String>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, ApiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            model: Mutex::new("test/model".to_string()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, history: &[Message]) -> Result<String, ApiError> {
        self.requests.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("no scripted reply")))
    }

    async fn check_connection(&self) -> bool {
        true
    }

    fn current_model(&self) -> String {
        self.model.lock().unwrap().clone()
    }

    fn set_model(&self, model: &str) {
        *self.model.lock().unwrap() = model.to_string();
    }
}

/// Blocks every request until `release` is notified.
#[derive(Default)]
pub struct GatedClient {
    pub calls: AtomicUsize,
    pub started: Notify,
    pub release: Notify,
}

impl GatedClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for GatedClient {
    async fn complete(&self, _history: &[Message]) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok("done".to_string())
    }

    async fn check_connection(&self) -> bool {
        true
    }

    fn current_model(&self) -> String {
        "gated".to_string()
    }

    fn set_model(&self, _model: &str) {}
}

/// Deterministic transaction codes: TX1, TX2, ...
#[derive(Default)]
pub struct SequenceCodes {
    next: AtomicUsize,
}

impl TransactionCodeGenerator for SequenceCodes {
    fn next_code(&self) -> String {
        format!("TX{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
