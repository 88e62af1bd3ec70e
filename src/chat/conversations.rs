use chrono::Utc;
use tracing::debug;

use crate::guard::ChatTarget;
use crate::models::{Conversation, ConversationKey};

/// Name shown for a counterpart the server has not described yet.
pub const PLACEHOLDER_NAME: &str = "Property Owner";

/// A conversation row: either synthesized locally before the first message
/// exists, or the server's record.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEntry {
    Pending(Conversation),
    Confirmed(Conversation),
}

impl ConversationEntry {
    pub fn conversation(&self) -> &Conversation {
        match self {
            ConversationEntry::Pending(c) | ConversationEntry::Confirmed(c) => c,
        }
    }

    pub fn key(&self) -> ConversationKey {
        self.conversation().key()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ConversationEntry::Pending(_))
    }
}

/// Placeholder for a listing the user is contacting for the first time.
pub fn placeholder(target: &ChatTarget) -> Conversation {
    Conversation {
        property_id: target.property_id.clone(),
        property_title: target.property_title.clone(),
        property_image: target.property_image.clone(),
        other_user_id: target.owner_id.clone(),
        other_user_name: PLACEHOLDER_NAME.to_string(),
        last_message: String::new(),
        last_message_time: Utc::now(),
        unread_count: 0,
        is_sender: false,
    }
}

/// Ticket for one list fetch; only the latest may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTicket(u64);

/// The signed-in user's conversations in server order, plus any placeholders
/// not yet confirmed.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    entries: Vec<ConversationEntry>,
    pub loading: bool,
    /// At least one fetch has completed successfully.
    pub loaded: bool,
    generation: u64,
}

impl ConversationList {
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ConversationKey) -> Option<&ConversationEntry> {
        self.entries.iter().find(|e| &e.key() == key)
    }

    pub fn begin_load(&mut self) -> ListTicket {
        self.generation += 1;
        self.loading = true;
        ListTicket(self.generation)
    }

    /// Replaces the list with the server's, keeping placeholders the server
    /// has not confirmed yet at the top. A placeholder is superseded only by a
    /// record with the same property and counterpart.
    pub fn apply_load(&mut self, ticket: ListTicket, server: Vec<Conversation>) -> bool {
        if ticket.0 != self.generation {
            debug!("Dropping superseded conversation list");
            return false;
        }
        let pending: Vec<ConversationEntry> = self
            .entries
            .drain(..)
            .filter(|e| e.is_pending() && !server.iter().any(|c| c.key() == e.key()))
            .collect();
        self.entries = pending
            .into_iter()
            .chain(server.into_iter().map(ConversationEntry::Confirmed))
            .collect();
        self.loading = false;
        self.loaded = true;
        true
    }

    /// The previous list stays.
    pub fn fail_load(&mut self, ticket: ListTicket) {
        if ticket.0 == self.generation {
            self.loading = false;
        }
    }

    /// Finds the conversation for `target`, creating a placeholder when none
    /// exists. Returns its key.
    pub fn open(&mut self, target: &ChatTarget) -> ConversationKey {
        let key = target.key();
        if self.get(&key).is_none() {
            debug!("Creating placeholder conversation for property {}", key.property_id);
            self.entries.insert(0, ConversationEntry::Pending(placeholder(target)));
        }
        key
    }

    /// Records a message the user just sent on the matching row.
    pub fn note_sent(&mut self, key: &ConversationKey, text: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.key() == key) {
            let conv = match entry {
                ConversationEntry::Pending(c) | ConversationEntry::Confirmed(c) => c,
            };
            conv.last_message = text.to_string();
            conv.last_message_time = Utc::now();
            conv.is_sender = true;
        }
    }
}
