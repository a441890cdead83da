use super::{ ApiError, ChatBackend };
use crate::models::{ Conversation, StoredMessage };
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::collections::{ HashMap, VecDeque };
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    List,
    Rename {
        id: String,
        title: String,
    },
    Fetch(String),
    Send {
        message: String,
        conversation_id: Option<String>,
    },
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".into(),
    }
}

/// Scripted backend. Unscripted calls fail with a 500.
#[derive(Default)]
pub struct MockBackend {
    conversations: Mutex<Option<Vec<Conversation>>>,
    histories: Mutex<HashMap<String, Vec<StoredMessage>>>,
    replies: Mutex<VecDeque<Option<JsonValue>>>,
    rename_ok: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
    send_gate: Mutex<Option<Arc<Notify>>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_conversations(&self, conversations: Vec<Conversation>) {
        *self.conversations.lock() = Some(conversations);
    }

    pub fn with_history(&self, id: &str, messages: Vec<StoredMessage>) {
        self.histories.lock().insert(id.to_string(), messages);
    }

    pub fn push_reply(&self, reply: JsonValue) {
        self.replies.lock().push_back(Some(reply));
    }

    pub fn push_failure(&self) {
        self.replies.lock().push_back(None);
    }

    pub fn accept_renames(&self) {
        *self.rename_ok.lock() = true;
    }

    /// Holds every send until the returned handle is notified.
    pub fn gate_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.send_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn gate_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn send_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        self.record(Call::List);
        self.conversations.lock().clone().ok_or_else(server_error)
    }

    async fn rename_conversation(&self, id: &str, new_title: &str) -> Result<String, ApiError> {
        self.record(Call::Rename {
            id: id.to_string(),
            title: new_title.to_string(),
        });
        if *self.rename_ok.lock() {
            Ok(new_title.to_string())
        } else {
            Err(server_error())
        }
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        self.record(Call::Fetch(conversation_id.to_string()));
        let gate = self.fetch_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.histories.lock().get(conversation_id).cloned().ok_or_else(server_error)
    }

    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>
    ) -> Result<JsonValue, ApiError> {
        self.record(Call::Send {
            message: message.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        });
        let gate = self.send_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.replies.lock().pop_front().flatten().ok_or_else(server_error)
    }
}
