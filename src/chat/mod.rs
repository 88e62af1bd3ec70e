//! Messaging view state: the conversation list, the open thread and the
//! unread badge, kept consistent with the server while requests overlap.

mod conversations;
mod thread;
mod unread;

pub use conversations::{placeholder, ConversationEntry, ConversationList, ListTicket, PLACEHOLDER_NAME};
pub use thread::{SendTicket, ThreadState, ThreadTicket};
pub use unread::{refresh_unread, CountTicket, UnreadCounter};

use futures_util::join;
use tracing::{debug, info, warn};

use crate::api::RentalApi;
use crate::errors::AppError;
use crate::guard::ChatTarget;
use crate::models::{Conversation, ConversationKey, User};
use crate::state::StateHandle;

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub conversations: ConversationList,
    pub thread: ThreadState,
}

impl ChatState {
    pub fn selected_conversation(&self) -> Option<&ConversationEntry> {
        self.thread.selected().and_then(|key| self.conversations.get(key))
    }

    pub fn is_selected(&self, key: &ConversationKey) -> bool {
        self.thread.selected() == Some(key)
    }

    /// Opens the conversation for a listing the user chose to contact,
    /// creating a placeholder row if needed and seeding the compose box with
    /// the target's prefill.
    pub fn open(&mut self, target: &ChatTarget) -> Result<bool, AppError> {
        let key = self.conversations.open(target);
        let changed = self.thread.select(key)?;
        if let Some(prefill) = &target.prefill {
            self.thread.compose = prefill.clone();
        }
        Ok(changed)
    }

    /// Commits a conversation list fetch. An open thread whose conversation
    /// the server no longer lists is closed.
    pub fn apply_conversations(&mut self, ticket: ListTicket, list: Vec<Conversation>) -> bool {
        if !self.conversations.apply_load(ticket, list) {
            return false;
        }
        let orphaned = self
            .thread
            .selected()
            .is_some_and(|key| self.conversations.get(key).is_none());
        if orphaned {
            debug!("Open conversation is gone, closing thread");
            self.thread.close();
        }
        true
    }
}

/// Runs the chat view's network traffic for one signed-in user.
#[derive(Clone)]
pub struct ChatController<A, C, U> {
    api: A,
    chat: C,
    unread: U,
    viewer: User,
    token: String,
}

impl<A, C, U> ChatController<A, C, U>
where
    A: RentalApi,
    C: StateHandle<ChatState>,
    U: StateHandle<UnreadCounter>,
{
    pub fn new(api: A, chat: C, unread: U, viewer: User, token: impl Into<String>) -> Self {
        Self {
            api,
            chat,
            unread,
            viewer,
            token: token.into(),
        }
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    /// Entering the chat view: list and badge load together.
    pub async fn activate(&self) {
        join!(self.load_conversations(), self.refresh_unread());
    }

    pub async fn load_conversations(&self) {
        let Some(ticket) = self.chat.write(|c| c.conversations.begin_load()) else {
            return;
        };
        match self.api.conversations(&self.token).await {
            Ok(list) => {
                debug!("Loaded {} conversations", list.len());
                self.chat.write(|c| c.apply_conversations(ticket, list));
            }
            Err(e) => {
                warn!("Failed to load conversations: {e}");
                self.chat.write(|c| c.conversations.fail_load(ticket));
            }
        }
    }

    pub async fn refresh_unread(&self) {
        refresh_unread(&self.api, &self.token, &self.unread).await
    }

    /// Opens (or creates) the conversation for `target` and loads its thread.
    pub async fn open(&self, target: &ChatTarget) -> Result<(), AppError> {
        let changed = self.chat.write(|c| c.open(target)).unwrap_or(Ok(false))?;
        if changed {
            self.refresh_thread().await;
        }
        Ok(())
    }

    /// Selects a conversation row. Incomplete rows are refused without any
    /// request; reselecting the open row does nothing.
    pub async fn select(&self, key: ConversationKey) -> Result<(), AppError> {
        let changed = self.chat.write(|c| c.thread.select(key)).unwrap_or(Ok(false))?;
        if changed {
            self.refresh_thread().await;
        }
        Ok(())
    }

    /// Fetches the open thread, then marks whatever arrived unread for the
    /// viewer as read.
    pub async fn refresh_thread(&self) {
        let Some(ticket) = self.chat.write(|c| c.thread.begin_fetch()).flatten() else {
            return;
        };
        let fetched = self.api.thread(&self.token, &ticket.key).await;
        let to_mark = match fetched {
            Ok(messages) => self
                .chat
                .write(|c| c.thread.apply_fetch(&ticket, messages, &self.viewer.id))
                .flatten(),
            Err(e) => {
                warn!("Failed to load messages: {e}");
                self.chat.write(|c| c.thread.fail_fetch(&ticket));
                None
            }
        };
        if let Some(ids) = to_mark.filter(|ids| !ids.is_empty()) {
            self.mark_read(ids).await;
        }
    }

    async fn mark_read(&self, ids: Vec<String>) {
        match self.api.mark_read(&self.token, &ids).await {
            Ok(()) => {
                debug!("Marked {} messages read", ids.len());
                self.chat.write(|c| c.thread.confirm_read(&ids));
                self.refresh_unread().await;
            }
            Err(e) => {
                warn!("Failed to mark messages read: {e}");
                self.chat.write(|c| c.thread.retry_read(&ids));
            }
        }
    }

    /// Sends the compose box to the open conversation. Validation errors are
    /// returned without a request; a failed request is reported inline and
    /// returned as well.
    pub async fn send(&self) -> Result<(), AppError> {
        let Some(ticket) = self.chat.write(|c| c.thread.begin_send()) else {
            return Ok(());
        };
        let ticket = ticket?;
        let result = self.api.send_message(&self.token, &ticket.request).await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        };
        self.chat.write(|c| {
            c.thread.finish_send(&ticket, result);
            if outcome.is_ok() {
                c.conversations.note_sent(&ticket.key, &ticket.request.message);
            }
        });
        if outcome.is_ok() {
            info!("Message sent on property {}", ticket.key.property_id);
            self.load_conversations().await;
        }
        outcome
    }
}
