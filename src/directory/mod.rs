use crate::api::ChatBackend;
use crate::models::Conversation;
use log::{ error, info, warn };
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Conversation>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditState {
    pub conversation_id: String,
    pub draft: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed(String),
    Cancelled,
    /// The request failed; the edit stays open with the draft intact.
    Failed,
    NotEditing,
}

/// The sidebar list of past conversations with inline rename.
pub struct ConversationDirectory {
    backend: Arc<dyn ChatBackend>,
    list: ListState,
    editing: Option<EditState>,
}

impl ConversationDirectory {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            list: ListState::Loading,
            editing: None,
        }
    }

    /// Fetches the conversation list once. Failures are logged and leave the
    /// list empty; nothing is surfaced to the user.
    pub async fn load(&mut self) {
        match self.backend.list_conversations().await {
            Ok(conversations) => {
                info!("Loaded {} conversations", conversations.len());
                self.list = ListState::Loaded(conversations);
            }
            Err(e) => {
                error!("Error fetching history: {}", e);
                self.list = ListState::Loaded(Vec::new());
            }
        }
    }

    pub fn state(&self) -> &ListState {
        &self.list
    }

    pub fn conversations(&self) -> &[Conversation] {
        match &self.list {
            ListState::Loaded(conversations) => conversations,
            ListState::Loading => &[],
        }
    }

    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations()
            .iter()
            .find(|c| c.id == id)
    }

    /// Resolves a click target to the id handed up to the shell. Accepts an
    /// id or a 1-based list position.
    pub fn select_conversation(&self, target: &str) -> Option<String> {
        if let Some(conv) = self.find(target) {
            return Some(conv.id.clone());
        }
        target
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.conversations().get(idx))
            .map(|c| c.id.clone())
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    /// Enters edit mode for `id`, seeding the draft with its current title.
    /// Any other open edit is dropped.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(conv) = self.find(id) else {
            warn!("Cannot edit unknown conversation {}", id);
            return false;
        };
        self.editing = Some(EditState {
            conversation_id: conv.id.clone(),
            draft: conv.display_title(),
        });
        true
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = draft.into();
        }
    }

    /// Escape.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Enter.
    pub async fn commit_edit(&mut self) -> RenameOutcome {
        let Some(edit) = self.editing.clone() else {
            return RenameOutcome::NotEditing;
        };
        self.rename_conversation(&edit.conversation_id, &edit.draft).await
    }

    /// Focus leaving the input commits like Enter.
    pub async fn blur(&mut self) -> RenameOutcome {
        self.commit_edit().await
    }

    pub async fn rename_conversation(&mut self, id: &str, new_title: &str) -> RenameOutcome {
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            self.editing = None;
            return RenameOutcome::Cancelled;
        }

        match self.backend.rename_conversation(id, trimmed).await {
            Ok(title) => {
                if let ListState::Loaded(conversations) = &mut self.list {
                    if let Some(conv) = conversations.iter_mut().find(|c| c.id == id) {
                        conv.title = Some(title.clone());
                    }
                }
                if self.editing.as_ref().is_some_and(|e| e.conversation_id == id) {
                    self.editing = None;
                }
                info!("Renamed conversation {} to {:?}", id, title);
                RenameOutcome::Renamed(title)
            }
            Err(e) => {
                error!("Error renaming conversation {}: {}", id, e);
                RenameOutcome::Failed
            }
        }
    }
}
