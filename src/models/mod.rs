pub mod analysis;
pub mod chat;

pub use analysis::Analysis;
pub use chat::{ ChatMessage, Conversation, MessageText, Sender, StoredMessage };
