mod file;

pub use file::FileSession;

use crate::cli::Args;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Key under which the sign-in flow stores the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read access to the signed-in user's bearer token.
///
/// Every backend call reads the token through this; nothing in the chat
/// client writes it except `clear`, which is how logout is implemented.
pub trait SessionProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn clear(&self) -> Result<(), SessionError>;
}

/// Token held in memory, typically taken from configuration.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write() = None;
        Ok(())
    }
}

pub fn initialize_session(args: &Args) -> Arc<dyn SessionProvider> {
    match &args.session_file {
        Some(path) => {
            info!("Reading session token from: {}", path);
            Arc::new(FileSession::new(path))
        }
        None => {
            if args.access_token.is_none() {
                info!("No access token configured; requests will be sent unauthenticated.");
            }
            Arc::new(StaticSession::new(args.access_token.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_counts_as_missing() {
        let session = StaticSession::new(Some(String::new()));
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn clear_forgets_token() {
        let session = StaticSession::new(Some("abc".into()));
        assert_eq!(session.access_token().as_deref(), Some("abc"));
        session.clear().unwrap();
        assert_eq!(session.access_token(), None);
    }
}
