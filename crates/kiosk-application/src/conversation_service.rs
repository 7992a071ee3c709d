//! Conversation use case implementation.
//!
//! `ConversationService` owns the `Conversation` state machine and carries out
//! the effects it returns: completion requests, history writes and view
//! updates.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use kiosk_core::conversation::{
    CompletionClient, Conversation, ConversationEffect, ConversationEvent,
    ConversationRepository, Message,
};
use kiosk_core::error::ApiError;
use kiosk_core::storage::Hydration;

use crate::view::ChatView;

/// What happened to a submitted text.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank text, a request already in flight, or a reply that arrived
    /// after the conversation was reset.
    Ignored,
    /// The assistant replied and the history was persisted.
    Replied(String),
    /// The completion request failed; only the user's message was kept.
    Failed(ApiError),
}

/// Use case for the chat assistant.
///
/// # Responsibilities
///
/// - Guarding against more than one completion request at a time
/// - Persisting the whole history after every successful exchange
/// - Recovering from unreadable stored history by starting over
/// - Forwarding view updates to every subscribed `ChatView`
///
/// # Thread Safety
///
/// State sits behind a `Mutex` that is only held for synchronous
/// transitions, never across the completion request.
pub struct ConversationService {
    state: Mutex<Conversation>,
    client: Arc<dyn CompletionClient>,
    repository: Arc<dyn ConversationRepository>,
    views: RwLock<Vec<Arc<dyn ChatView>>>,
    quick_prompts: Vec<String>,
}

impl ConversationService {
    /// Creates a service with an empty conversation. Call `hydrate` to
    /// restore the stored history.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        repository: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            state: Mutex::new(Conversation::new()),
            client,
            repository,
            views: RwLock::new(Vec::new()),
            quick_prompts: Vec::new(),
        }
    }

    /// Sets the canned prompts offered by `submit_quick`.
    pub fn with_quick_prompts(mut self, prompts: Vec<String>) -> Self {
        self.quick_prompts = prompts;
        self
    }

    /// Registers a view for subsequent updates.
    pub fn subscribe(&self, view: Arc<dyn ChatView>) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }

    fn state(&self) -> MutexGuard<'_, Conversation> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current history.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages().to_vec()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state().is_in_flight()
    }

    pub fn quick_prompts(&self) -> &[String] {
        &self.quick_prompts
    }

    /// Restores the stored history.
    ///
    /// Unreadable data is logged and discarded, never returned as an error.
    /// A store that cannot be read at all is treated as empty and left
    /// untouched.
    ///
    /// # Returns
    ///
    /// The outcome of reading storage, with the number of restored messages.
    pub fn hydrate(&self) -> Hydration<usize> {
        let outcome = match self.repository.load() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("[ConversationService] Failed to read history: {}", e);
                Hydration::Missing
            }
        };

        match &outcome {
            Hydration::Corrupted(reason) => {
                tracing::warn!(
                    "[ConversationService] Stored history is corrupted, starting over: {}",
                    reason
                );
            }
            Hydration::SchemaMismatch { found, expected } => {
                tracing::warn!(
                    "[ConversationService] Stored history has schema {} (expected {}), resetting",
                    found,
                    expected
                );
            }
            Hydration::Loaded(messages) => {
                tracing::info!(
                    "[ConversationService] Restored {} messages",
                    messages.len()
                );
            }
            Hydration::Missing => {}
        }

        let report = outcome.clone().map(|messages| messages.len());
        let effects = self.state().apply(ConversationEvent::Hydrated(outcome));
        self.execute(effects);
        report
    }

    /// Submits user text and waits for the assistant's reply.
    ///
    /// Blank text and submissions while a request is outstanding are
    /// silently dropped.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let effects = self
            .state()
            .apply(ConversationEvent::Submit(text.to_string()));
        let Some(history) = self.execute(effects) else {
            tracing::debug!("[ConversationService] Submit ignored");
            return SubmitOutcome::Ignored;
        };

        tracing::info!(
            "[ConversationService] Requesting completion ({} messages)",
            history.len()
        );
        let result = self.client.complete(&history).await;

        match result {
            Ok(reply) => {
                let effects = self
                    .state()
                    .apply(ConversationEvent::CompletionSucceeded(reply.clone()));
                let accepted = effects
                    .iter()
                    .any(|effect| matches!(effect, ConversationEffect::PersistHistory { .. }));
                self.execute(effects);
                if accepted {
                    SubmitOutcome::Replied(reply)
                } else {
                    SubmitOutcome::Ignored
                }
            }
            Err(error) => {
                tracing::warn!("[ConversationService] Completion failed: {}", error);
                let effects = self
                    .state()
                    .apply(ConversationEvent::CompletionFailed(error.clone()));
                self.execute(effects);
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Submits the configured quick prompt at `index`.
    pub async fn submit_quick(&self, index: usize) -> SubmitOutcome {
        let Some(prompt) = self.quick_prompts.get(index).cloned() else {
            tracing::warn!("[ConversationService] No quick prompt at index {}", index);
            return SubmitOutcome::Ignored;
        };
        self.submit(&prompt).await
    }

    /// Forgets the conversation, in memory and in storage.
    pub fn reset(&self) {
        let effects = self.state().apply(ConversationEvent::Reset);
        self.execute(effects);
        tracing::info!("[ConversationService] Conversation reset");
    }

    /// Switches the completion model. Blank names are ignored.
    pub fn set_model(&self, model: &str) {
        let model = model.trim();
        if model.is_empty() {
            return;
        }
        self.client.set_model(model);
    }

    pub fn current_model(&self) -> String {
        self.client.current_model()
    }

    /// Checks the completion API with the configured credential.
    pub async fn check_connection(&self) -> bool {
        self.client.check_connection().await
    }

    /// Runs effects in order and returns the history of a requested
    /// completion, if any. Storage failures are logged and do not roll back
    /// the in-memory state.
    fn execute(&self, effects: Vec<ConversationEffect>) -> Option<Vec<Message>> {
        let views = self
            .views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut request = None;

        for effect in effects {
            match effect {
                ConversationEffect::RequestCompletion { history } => request = Some(history),
                ConversationEffect::PersistHistory { messages } => {
                    if let Err(e) = self.repository.save(&messages) {
                        tracing::error!("[ConversationService] Failed to persist history: {}", e);
                    }
                }
                ConversationEffect::ClearStorage => {
                    if let Err(e) = self.repository.clear() {
                        tracing::error!("[ConversationService] Failed to clear history: {}", e);
                    }
                }
                ConversationEffect::ShowWelcome => views.iter().for_each(|v| v.show_welcome()),
                ConversationEffect::HideWelcome => views.iter().for_each(|v| v.hide_welcome()),
                ConversationEffect::RenderMessage(message) => {
                    views.iter().for_each(|v| v.render_message(&message))
                }
                ConversationEffect::RenderError(text) => {
                    views.iter().for_each(|v| v.render_error(&text))
                }
                ConversationEffect::ClearMessages => views.iter().for_each(|v| v.clear_messages()),
                ConversationEffect::SetLoading(loading) => {
                    views.iter().for_each(|v| v.set_loading(loading))
                }
            }
        }
        request
    }
}
