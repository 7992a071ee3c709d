//! Conversation state machine.
//!
//! `Conversation` holds the ordered message log and the in-flight flag. It
//! performs no I/O: every transition returns the list of effects the caller
//! has to carry out (send a completion request, rewrite storage, update the
//! view). `ConversationService` in the application layer executes them.

use super::message::Message;
use crate::error::ApiError;
use crate::storage::Hydration;

/// Inputs to the conversation state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    /// The user submitted text.
    Submit(String),
    /// The outstanding completion request returned assistant text.
    CompletionSucceeded(String),
    /// The outstanding completion request failed.
    CompletionFailed(ApiError),
    /// The user asked to forget the conversation.
    Reset,
    /// Persisted history was read at startup.
    Hydrated(Hydration<Vec<Message>>),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEffect {
    /// Send the full history to the completion API.
    RequestCompletion { history: Vec<Message> },
    /// Replace the persisted history with this sequence.
    PersistHistory { messages: Vec<Message> },
    /// Delete the persisted history.
    ClearStorage,
    /// Show the empty/welcome state.
    ShowWelcome,
    /// Hide the welcome state and show the message list.
    HideWelcome,
    /// Append a bubble for this message.
    RenderMessage(Message),
    /// Append an inline error bubble. Not part of the history.
    RenderError(String),
    /// Remove every rendered bubble.
    ClearMessages,
    /// Toggle the loading indicator.
    SetLoading(bool),
}

/// Text shown in the inline error bubble after a failed exchange.
pub fn error_notice(error: &ApiError) -> String {
    format!(
        "Sorry, I ran into an error. Please try again. Error: {}",
        error
    )
}

/// The conversation log and its single-request guard.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: bool,
    /// Set when `Reset` arrives while a request is outstanding; the late
    /// reply must not land in the fresh history.
    discard_pending: bool,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered message log.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a completion request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Applies one event and returns the effects to execute, in order.
    pub fn apply(&mut self, event: ConversationEvent) -> Vec<ConversationEffect> {
        match event {
            ConversationEvent::Submit(text) => self.submit(text),
            ConversationEvent::CompletionSucceeded(text) => self.complete(text),
            ConversationEvent::CompletionFailed(error) => self.fail(error),
            ConversationEvent::Reset => self.reset(),
            ConversationEvent::Hydrated(outcome) => self.hydrate(outcome),
        }
    }

    fn submit(&mut self, text: String) -> Vec<ConversationEffect> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return Vec::new();
        }

        let mut effects = Vec::with_capacity(4);
        if self.messages.is_empty() {
            effects.push(ConversationEffect::HideWelcome);
        }

        let message = Message::user(text);
        self.messages.push(message.clone());
        self.in_flight = true;

        effects.push(ConversationEffect::RenderMessage(message));
        effects.push(ConversationEffect::SetLoading(true));
        effects.push(ConversationEffect::RequestCompletion {
            history: self.messages.clone(),
        });
        effects
    }

    fn complete(&mut self, text: String) -> Vec<ConversationEffect> {
        if !self.in_flight {
            tracing::debug!("[Conversation] Ignoring completion with no request in flight");
            return Vec::new();
        }
        self.in_flight = false;

        if std::mem::take(&mut self.discard_pending) {
            tracing::debug!("[Conversation] Dropping reply to a request made before reset");
            return vec![ConversationEffect::SetLoading(false)];
        }

        let message = Message::assistant(text);
        self.messages.push(message.clone());
        vec![
            ConversationEffect::RenderMessage(message),
            ConversationEffect::PersistHistory {
                messages: self.messages.clone(),
            },
            ConversationEffect::SetLoading(false),
        ]
    }

    fn fail(&mut self, error: ApiError) -> Vec<ConversationEffect> {
        if !self.in_flight {
            return Vec::new();
        }
        self.in_flight = false;

        if std::mem::take(&mut self.discard_pending) {
            return vec![ConversationEffect::SetLoading(false)];
        }

        vec![
            ConversationEffect::RenderError(error_notice(&error)),
            ConversationEffect::SetLoading(false),
        ]
    }

    fn reset(&mut self) -> Vec<ConversationEffect> {
        self.messages.clear();
        if self.in_flight {
            self.discard_pending = true;
        }
        vec![
            ConversationEffect::ClearMessages,
            ConversationEffect::ShowWelcome,
            ConversationEffect::ClearStorage,
        ]
    }

    fn hydrate(&mut self, outcome: Hydration<Vec<Message>>) -> Vec<ConversationEffect> {
        match outcome {
            Hydration::Loaded(messages) if !messages.is_empty() => {
                self.messages = messages;
                let mut effects = Vec::with_capacity(self.messages.len() + 1);
                effects.push(ConversationEffect::HideWelcome);
                effects.extend(
                    self.messages
                        .iter()
                        .cloned()
                        .map(ConversationEffect::RenderMessage),
                );
                effects
            }
            Hydration::Loaded(_) | Hydration::Missing => {
                self.messages.clear();
                vec![ConversationEffect::ShowWelcome]
            }
            Hydration::Corrupted(_) | Hydration::SchemaMismatch { .. } => self.reset(),
        }
    }
}
