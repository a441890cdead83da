use crate::api::ChatBackend;
use crate::directory::ConversationDirectory;
use crate::session::{ SessionError, SessionProvider };
use crate::thread::{ LoadOutcome, MessageThread };
use log::{ info, warn };
use std::sync::Arc;

/// Viewports narrower than this start with the sidebar closed and close it
/// again after a selection.
pub const NARROW_VIEWPORT: u32 = 768;

/// Composes the conversation directory and the message thread and owns the
/// state shared between them.
pub struct ChatShell {
    directory: ConversationDirectory,
    thread: MessageThread,
    session: Arc<dyn SessionProvider>,
    active_conversation_id: Option<String>,
    sidebar_visible: bool,
    viewport_width: u32,
}

impl ChatShell {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        session: Arc<dyn SessionProvider>,
        viewport_width: u32
    ) -> Self {
        Self {
            directory: ConversationDirectory::new(backend.clone()),
            thread: MessageThread::new(backend),
            session,
            active_conversation_id: None,
            sidebar_visible: viewport_width >= NARROW_VIEWPORT,
            viewport_width,
        }
    }

    pub async fn mount(&mut self) {
        self.directory.load().await;
    }

    pub fn directory(&self) -> &ConversationDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut ConversationDirectory {
        &mut self.directory
    }

    pub fn thread(&self) -> &MessageThread {
        &self.thread
    }

    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_conversation_id.as_deref()
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    pub fn is_narrow(&self) -> bool {
        self.viewport_width < NARROW_VIEWPORT
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_visible = !self.sidebar_visible;
        self.sidebar_visible
    }

    /// Activates a conversation by id or list position. A non-numeric
    /// target missing from the list is still opened by id; a position past
    /// the end of the list opens nothing and returns `None`.
    pub async fn select_conversation(&mut self, target: &str) -> Option<LoadOutcome> {
        let id = match self.directory.select_conversation(target) {
            Some(id) => id,
            None if target.chars().all(|c| c.is_ascii_digit()) => {
                warn!("No conversation at position {}", target);
                return None;
            }
            None => target.to_string(),
        };
        Some(self.open_conversation(id).await)
    }

    /// Activates a conversation by its backend id without consulting the list.
    pub async fn open_conversation(&mut self, id: String) -> LoadOutcome {
        info!("Selected conversation {}", id);
        self.active_conversation_id = Some(id.clone());
        if self.is_narrow() {
            self.sidebar_visible = false;
        }
        self.thread.set_conversation(Some(id)).await
    }

    pub async fn new_chat(&mut self) -> LoadOutcome {
        self.active_conversation_id = None;
        self.thread.set_conversation(None).await
    }

    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.session.clear()?;
        self.new_chat().await;
        info!("Logged out");
        Ok(())
    }
}
