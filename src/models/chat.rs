use log::warn;
use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

use super::analysis::Analysis;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConversationRow")]
pub struct Conversation {
    pub id: String,
    pub title: Option<String>,
}

/// List rows carry `id`, `_id`, or both.
#[derive(Deserialize)]
struct ConversationRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = String;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        let id = row.id
            .filter(|id| !id.is_empty())
            .or(row.mongo_id.filter(|id| !id.is_empty()))
            .ok_or_else(|| "conversation has neither `id` nor `_id`".to_string())?;
        Ok(Self { id, title: row.title })
    }
}

impl Conversation {
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Conversation {}", self.id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageText {
    Plain(String),
    Analysis(Box<Analysis>),
}

impl MessageText {
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            MessageText::Plain(text) => Some(text),
            MessageText::Analysis(_) => None,
        }
    }

    pub fn as_analysis(&self) -> Option<&Analysis> {
        match self {
            MessageText::Analysis(analysis) => Some(analysis),
            MessageText::Plain(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub from: Sender,
    pub text: MessageText,
    pub show_follow_up: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            from: Sender::User,
            text: MessageText::Plain(text.into()),
            show_follow_up: false,
        }
    }

    pub fn bot(text: MessageText, show_follow_up: bool) -> Self {
        Self {
            from: Sender::Bot,
            text,
            show_follow_up,
        }
    }
}

/// A history entry exactly as the backend stores it, before any re-parsing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredMessage {
    pub from: Sender,
    #[serde(default)]
    pub text: JsonValue,
}

/// Decodes history rows one by one; rows with an unknown role or a broken
/// shape are logged and skipped instead of failing the whole history.
pub fn decode_history(rows: Vec<JsonValue>) -> Vec<StoredMessage> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<StoredMessage>(row) {
            Ok(msg) => messages.push(msg),
            Err(e) => {
                warn!("Skipping history entry: {}", e);
            }
        }
    }
    messages
}

#[derive(Serialize, Debug)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub reply: JsonValue,
}

#[derive(Serialize, Debug)]
pub struct RenameRequest<'a> {
    #[serde(rename = "newTitle")]
    pub new_title: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct RenameResponse {
    pub title: String,
}
