//! Chat widget controller: the message log, the composer and one request per
//! user turn against `POST /api/chat`.

use std::{fmt, mem, sync::Arc};

use shared::{domain::ChatMessage, protocol::ChatRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{api::SiteApi, config::DEFAULT_CHAT_HISTORY_WINDOW, store::StateStore};

pub const GREETING: &str = "Hello! I'm here to help you learn about our electric bikes. \
Ask me anything about our models, features, pricing, or maintenance!";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting. Please try again.";
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub pending_input: String,
    pub is_awaiting_reply: bool,
    pub last_error: Option<String>,
    session: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
            pending_input: String::new(),
            is_awaiting_reply: false,
            last_error: None,
            session: 0,
        }
    }
}

/// A user message that has been appended to the log and still needs a reply.
/// Only [`ConversationController::append_user_message`] creates one.
///
/// A turn settles exactly once: with the backend reply, or with
/// [`FALLBACK_REPLY`] if the request fails, is cancelled, or the turn is
/// dropped unsent. Settling clears `is_awaiting_reply`.
#[must_use = "an unsent turn is answered with the fallback reply when dropped"]
pub struct ChatTurn {
    message: String,
    history: Vec<ChatMessage>,
    session: u64,
    store: Arc<StateStore<ConversationState>>,
    settled: bool,
}

impl ChatTurn {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Appends the bot message for this turn, `None` meaning the fallback.
    fn settle(&mut self, reply: Option<String>) -> TurnOutcome {
        self.settled = true;
        let session = self.session;
        let mut outcome = TurnOutcome::Discarded;
        self.store.update(|state| {
            state.is_awaiting_reply = false;
            if state.session != session {
                return;
            }
            match reply {
                Some(text) => {
                    state.messages.push(ChatMessage::bot(text));
                    outcome = TurnOutcome::Replied;
                }
                None => {
                    state.last_error = Some(CONNECTION_ERROR_MESSAGE.to_string());
                    state.messages.push(ChatMessage::bot(FALLBACK_REPLY));
                    outcome = TurnOutcome::FellBack;
                }
            }
        });
        outcome
    }
}

impl fmt::Debug for ChatTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTurn")
            .field("message", &self.message)
            .field("history", &self.history)
            .field("session", &self.session)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl Drop for ChatTurn {
    fn drop(&mut self) {
        if !self.settled {
            warn!("chat turn ended without a reply; appending fallback");
            self.settle(None);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied,
    FellBack,
    /// The log was cleared while the request was in flight; the reply was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Enter,
    ShiftEnter,
    Char(char),
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Edited,
    Sent(TurnOutcome),
    Ignored,
}

/// The last `window` messages in their original order.
pub fn trailing_window(messages: &[ChatMessage], window: usize) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(window);
    messages[start..].to_vec()
}

pub struct ConversationController {
    api: Arc<dyn SiteApi>,
    history_window: usize,
    store: Arc<StateStore<ConversationState>>,
}

impl ConversationController {
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self::with_history_window(api, DEFAULT_CHAT_HISTORY_WINDOW)
    }

    pub fn with_history_window(api: Arc<dyn SiteApi>, history_window: usize) -> Self {
        Self {
            api,
            history_window: history_window.max(1),
            store: Arc::new(StateStore::new(ConversationState::default())),
        }
    }

    pub fn state(&self) -> ConversationState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.store.subscribe()
    }

    pub fn set_pending_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.store.update(|state| state.pending_input = text);
    }

    /// Starts a turn. Returns `None` without touching state when `text` is
    /// blank or the previous turn has not been answered yet.
    pub fn append_user_message(&self, text: &str) -> Option<ChatTurn> {
        if text.trim().is_empty() {
            return None;
        }

        let mut turn = None;
        self.store.update_if(|state| {
            if state.is_awaiting_reply {
                return false;
            }
            state.messages.push(ChatMessage::user(text));
            state.pending_input.clear();
            state.last_error = None;
            state.is_awaiting_reply = true;
            turn = Some(ChatTurn {
                message: text.to_string(),
                history: trailing_window(&state.messages, self.history_window),
                session: state.session,
                store: Arc::clone(&self.store),
                settled: false,
            });
            true
        });

        if turn.is_none() {
            debug!("chat send ignored while awaiting a reply");
        }
        turn
    }

    /// Sends one turn and appends exactly one bot message for it: the reply,
    /// or [`FALLBACK_REPLY`] on any failure. Dropping this future before it
    /// completes settles the turn with the fallback.
    pub async fn send_to_backend(&self, mut turn: ChatTurn) -> TurnOutcome {
        let request = ChatRequest {
            message: mem::take(&mut turn.message),
            conversation_history: mem::take(&mut turn.history),
        };

        let outcome = match self.api.send_chat(&request).await {
            Ok(reply) => turn.settle(Some(reply.response)),
            Err(err) => {
                debug!(status = ?err.status(), "chat turn falling back");
                turn.settle(None)
            }
        };

        if outcome == TurnOutcome::Discarded {
            info!("dropping chat reply for a cleared conversation");
        }
        outcome
    }

    pub async fn send(&self, text: &str) -> Option<TurnOutcome> {
        let turn = self.append_user_message(text)?;
        Some(self.send_to_backend(turn).await)
    }

    pub async fn send_pending(&self) -> Option<TurnOutcome> {
        let text = self.store.read(|state| state.pending_input.clone());
        self.send(&text).await
    }

    /// Composer key handling: Enter submits, Shift+Enter adds a line break.
    pub async fn handle_key(&self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Enter => match self.send_pending().await {
                Some(outcome) => KeyOutcome::Sent(outcome),
                None => KeyOutcome::Ignored,
            },
            KeyInput::ShiftEnter => {
                self.store.update(|state| state.pending_input.push('\n'));
                KeyOutcome::Edited
            }
            KeyInput::Char(c) => {
                self.store.update(|state| state.pending_input.push(c));
                KeyOutcome::Edited
            }
            KeyInput::Backspace => {
                let changed = self
                    .store
                    .update_if(|state| state.pending_input.pop().is_some());
                if changed {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Resets the log to the greeting. The composer keeps its text.
    pub fn clear(&self) {
        self.store.update(|state| {
            state.messages = vec![ChatMessage::bot(GREETING)];
            state.last_error = None;
            state.session += 1;
        });
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
