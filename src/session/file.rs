use super::{ SessionError, SessionProvider, ACCESS_TOKEN_KEY };
use log::{ error, info };
use serde_json::{ Map, Value as JsonValue };
use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

/// A JSON key/value file shared with the sign-in flow, read fresh on every
/// request so a token refreshed elsewhere is picked up without a restart.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Map<String, JsonValue>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(e.into());
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl SessionProvider for FileSession {
    fn access_token(&self) -> Option<String> {
        match self.load() {
            Ok(entries) =>
                entries
                    .get(ACCESS_TOKEN_KEY)
                    .and_then(|v| v.as_str())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            Err(e) => {
                error!("Error reading session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Session cleared: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
