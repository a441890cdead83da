use crate::api::ChatBackend;
use crate::models::{ ChatMessage, Sender };
use crate::reply::{ classify_reply, parse_stored_message };
use log::{ error, info, warn };
use parking_lot::Mutex;
use std::sync::Arc;

pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
pub const FETCH_FAILED: &str = "Failed to load messages. Please try again.";
pub const NO_CONVERSATION: &str =
    "No active conversation. Select a conversation before sending a message.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUpAnswer {
    Yes,
    No,
}

impl FollowUpAnswer {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpAnswer::Yes => "YES",
            FollowUpAnswer::No => "NO",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, a send already in flight, or no follow-up to answer.
    Ignored,
    NoConversation,
    Delivered,
    Failed,
    /// The thread was reset or switched while the request was out.
    Discarded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Cleared,
    Unchanged,
    Loaded(usize),
    Failed,
    Discarded,
}

/// Point-in-time copy of the thread for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThreadSnapshot {
    pub conversation_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub loading: bool,
    pub error: Option<String>,
    pub started: bool,
}

impl ThreadSnapshot {
    /// Only the newest bot message flagged for follow-up offers YES/NO.
    pub fn follow_up_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.from == Sender::Bot && m.show_follow_up)
    }
}

#[derive(Default)]
struct ThreadState {
    view: ThreadSnapshot,
    // Bumped on every switch or reset; responses carrying an older value are dropped.
    generation: u64,
}

impl ThreadState {
    fn clear(&mut self) {
        self.view.messages.clear();
        self.view.input.clear();
        self.view.error = None;
        self.view.started = false;
        self.view.loading = false;
        self.generation += 1;
    }
}

/// Messages exchanged in one conversation.
///
/// Cloning yields another handle to the same thread. State is only locked
/// between awaits, so callers observe the optimistic user message while the
/// backend call is still pending.
#[derive(Clone)]
pub struct MessageThread {
    backend: Arc<dyn ChatBackend>,
    state: Arc<Mutex<ThreadState>>,
}

impl MessageThread {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(ThreadState::default())),
        }
    }

    pub fn snapshot(&self) -> ThreadSnapshot {
        self.state.lock().view.clone()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.state.lock().view.conversation_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().view.loading
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state.lock().view.input = text.into();
    }

    /// Enter in the input box.
    pub async fn submit(&self) -> SendOutcome {
        let input = self.state.lock().view.input.clone();
        self.send_message(&input).await
    }

    /// Points the thread at another conversation. `None` clears it with no
    /// network call; an id loads that conversation's history.
    pub async fn set_conversation(&self, id: Option<String>) -> LoadOutcome {
        let (id, generation) = {
            let mut state = self.state.lock();
            match id {
                None => {
                    state.clear();
                    state.view.conversation_id = None;
                    return LoadOutcome::Cleared;
                }
                Some(id) if state.view.conversation_id.as_deref() == Some(id.as_str()) => {
                    return LoadOutcome::Unchanged;
                }
                Some(id) => {
                    state.clear();
                    state.view.conversation_id = Some(id.clone());
                    (id, state.generation)
                }
            }
        };

        let result = self.backend.fetch_messages(&id).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            warn!("Discarding history for conversation {}: thread moved on", id);
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(stored) => {
                let mut history: Vec<ChatMessage> = stored
                    .into_iter()
                    .map(parse_stored_message)
                    .collect();
                let count = history.len();
                // Anything sent while history was in flight is newer than all of it.
                history.append(&mut state.view.messages);
                state.view.messages = history;
                info!("Loaded {} messages for conversation {}", count, id);
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                error!("Error fetching messages for conversation {}: {}", id, e);
                state.view.error = Some(FETCH_FAILED.to_string());
                LoadOutcome::Failed
            }
        }
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        let (conversation_id, generation) = {
            let mut state = self.state.lock();
            if message.is_empty() || state.view.loading {
                return SendOutcome::Ignored;
            }
            let Some(id) = state.view.conversation_id.clone() else {
                warn!("Send attempted with no active conversation");
                state.view.error = Some(NO_CONVERSATION.to_string());
                return SendOutcome::NoConversation;
            };
            state.view.input.clear();
            state.view.messages.push(ChatMessage::user(message));
            state.view.loading = true;
            state.view.error = None;
            state.view.started = true;
            (id, state.generation)
        };

        let result = self.backend.send_message(message, Some(&conversation_id)).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            warn!("Discarding reply for conversation {}: thread moved on", conversation_id);
            return SendOutcome::Discarded;
        }
        state.view.loading = false;
        match result {
            Ok(reply) => {
                state.view.messages.push(classify_reply(&reply).into_message());
                SendOutcome::Delivered
            }
            Err(e) => {
                error!("Error sending message to conversation {}: {}", conversation_id, e);
                state.view.error = Some(SEND_FAILED.to_string());
                SendOutcome::Failed
            }
        }
    }

    pub async fn answer_follow_up(&self, answer: FollowUpAnswer) -> SendOutcome {
        if self.snapshot().follow_up_index().is_none() {
            return SendOutcome::Ignored;
        }
        self.send_message(answer.as_str()).await
    }

    /// Clears the local thread only; the backend and the active id are untouched.
    pub fn reset_conversation(&self) {
        self.state.lock().clear();
    }
}
