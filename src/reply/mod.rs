use crate::models::analysis::display_value;
use crate::models::{ Analysis, ChatMessage, MessageText, Sender, StoredMessage };
use lazy_static::lazy_static;
use log::{ debug, warn };
use regex::Regex;
use serde_json::Value as JsonValue;

/// Closing question the assistant appends once an analysis is complete.
pub const COMPLETION_MARKER: &str = "Do you want me to create a Business Plan and Marketing doc?";

lazy_static! {
    static ref FENCED_PAYLOAD: Regex = Regex::new(r"```(?i:json)?[ \t]*\r?\n?\s*(\{[\s\S]*?\})\s*```").unwrap();
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReply {
    pub text: MessageText,
    pub show_follow_up: bool,
}

impl ParsedReply {
    fn plain(text: String) -> Self {
        Self {
            text: MessageText::Plain(text),
            show_follow_up: false,
        }
    }

    fn analysis(analysis: Analysis) -> Self {
        Self {
            text: MessageText::Analysis(Box::new(analysis)),
            show_follow_up: true,
        }
    }

    pub fn into_message(self) -> ChatMessage {
        ChatMessage::bot(self.text, self.show_follow_up)
    }
}

/// Classifies a fresh `reply` payload from the send endpoint.
///
/// Precedence: a JSON object is read as an analysis; a string that opens
/// with `{` is parsed as one; anything else (or anything that fails to parse)
/// is shown as plain text. Never fails.
pub fn classify_reply(reply: &JsonValue) -> ParsedReply {
    match reply {
        JsonValue::Object(_) =>
            match serde_json::from_value::<Analysis>(reply.clone()) {
                Ok(analysis) => ParsedReply::analysis(analysis),
                Err(e) => {
                    warn!("Reply object is not an analysis ({}); showing it as text", e);
                    ParsedReply::plain(reply.to_string())
                }
            }
        JsonValue::String(text) if text.trim_start().starts_with('{') =>
            match serde_json::from_str::<Analysis>(text) {
                Ok(analysis) => ParsedReply::analysis(analysis),
                Err(e) => {
                    debug!("Brace-prefixed reply did not parse as analysis: {}", e);
                    ParsedReply::plain(text.clone())
                }
            }
        JsonValue::String(text) => ParsedReply::plain(text.clone()),
        JsonValue::Null => ParsedReply::plain(String::new()),
        other => ParsedReply::plain(display_value(other)),
    }
}

/// Extracts an analysis from a fenced block inside stored bot text.
pub fn extract_fenced_analysis(raw: &str) -> Option<Analysis> {
    let payload = FENCED_PAYLOAD.captures(raw)?.get(1)?.as_str();
    match serde_json::from_str::<Analysis>(payload) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            debug!("Fenced block is not an analysis: {}", e);
            None
        }
    }
}

pub fn has_completion_marker(raw: &str) -> bool {
    raw.to_lowercase().contains(&COMPLETION_MARKER.to_lowercase())
}

/// Converts one history entry into a thread message. Bot text with an
/// embedded analysis is replaced by the parsed analysis; on any parse
/// failure the raw text is kept untouched.
pub fn parse_stored_message(stored: StoredMessage) -> ChatMessage {
    match (stored.from, stored.text) {
        (Sender::User, text) => ChatMessage::user(text_of(&text)),
        (Sender::Bot, JsonValue::String(raw)) =>
            match extract_fenced_analysis(&raw) {
                Some(analysis) => {
                    let follow_up = has_completion_marker(&raw);
                    ChatMessage::bot(MessageText::Analysis(Box::new(analysis)), follow_up)
                }
                None => ChatMessage::bot(MessageText::Plain(raw), false),
            }
        (Sender::Bot, other) => {
            let mut parsed = classify_reply(&other);
            parsed.show_follow_up = false;
            parsed.into_message()
        }
    }
}

fn text_of(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        other => display_value(other),
    }
}
