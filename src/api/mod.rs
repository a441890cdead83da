mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpBackend;

use crate::models::{ Conversation, StoredMessage };
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status {
        status: StatusCode,
        body: String,
    },
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// The Craddule chat REST surface. Every call is authenticated with the
/// current session token and makes exactly one attempt.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError>;

    /// Returns the title the backend stored.
    async fn rename_conversation(&self, id: &str, new_title: &str) -> Result<String, ApiError>;

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>, ApiError>;

    /// Returns the raw `reply` field; its shape varies and is classified by
    /// `reply::classify_reply`.
    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>
    ) -> Result<JsonValue, ApiError>;
}
