use std::collections::HashSet;

use tracing::debug;

use crate::errors::AppError;
use crate::models::{ConversationKey, Message, SendMessageRequest};

/// Ticket for one thread fetch. It commits only if the same conversation is
/// still selected and no newer fetch or send has happened since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTicket {
    pub key: ConversationKey,
    generation: u64,
}

/// Ticket for one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    pub key: ConversationKey,
    pub request: SendMessageRequest,
}

/// The open message thread and its compose box.
#[derive(Debug, Clone, Default)]
pub struct ThreadState {
    selected: Option<ConversationKey>,
    messages: Vec<Message>,
    pub loading: bool,
    pub compose: String,
    pub sending: bool,
    /// Inline, retryable send failure.
    pub send_error: Option<String>,
    /// Bumped whenever the visible message set changes; the view scrolls to
    /// the newest message when it moves.
    pub scroll_revision: u64,
    /// Ids handed to mark-read and not yet confirmed.
    marking: HashSet<String>,
    generation: u64,
}

impl ThreadState {
    pub fn selected(&self) -> Option<&ConversationKey> {
        self.selected.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Makes `key` the open thread. Incomplete keys are refused and leave the
    /// current selection alone. Returns whether the selection changed.
    pub fn select(&mut self, key: ConversationKey) -> Result<bool, AppError> {
        if !key.is_complete() {
            return Err(AppError::IncompleteConversation);
        }
        if self.selected.as_ref() == Some(&key) {
            return Ok(false);
        }
        self.selected = Some(key);
        self.messages.clear();
        self.marking.clear();
        self.send_error = None;
        self.loading = false;
        self.generation += 1;
        self.scroll_revision += 1;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.messages.clear();
        self.marking.clear();
        self.send_error = None;
        self.loading = false;
        self.generation += 1;
    }

    pub fn begin_fetch(&mut self) -> Option<ThreadTicket> {
        let key = self.selected.clone().filter(ConversationKey::is_complete)?;
        self.generation += 1;
        self.loading = true;
        Some(ThreadTicket { key, generation: self.generation })
    }

    fn is_current(&self, ticket: &ThreadTicket) -> bool {
        self.generation == ticket.generation && self.selected.as_ref() == Some(&ticket.key)
    }

    /// Commits a fetched thread. Returns `None` for a stale ticket, otherwise
    /// the ids of messages addressed to `viewer_id` that still need marking
    /// read (possibly empty). Read flags never revert: a message already read
    /// locally stays read whatever the response says.
    pub fn apply_fetch(
        &mut self,
        ticket: &ThreadTicket,
        mut fetched: Vec<Message>,
        viewer_id: &str,
    ) -> Option<Vec<String>> {
        if !self.is_current(ticket) {
            debug!(
                "Dropping stale thread for property {} (other user {})",
                ticket.key.property_id, ticket.key.other_user_id
            );
            return None;
        }

        let read_locally: HashSet<&str> = self
            .messages
            .iter()
            .filter(|m| m.is_read)
            .map(|m| m.id.as_str())
            .collect();
        for m in fetched.iter_mut() {
            if read_locally.contains(m.id.as_str()) {
                m.is_read = true;
            }
        }

        if fetched != self.messages {
            self.scroll_revision += 1;
        }
        self.messages = fetched;
        self.loading = false;

        let to_mark: Vec<String> = self
            .messages
            .iter()
            .filter(|m| m.is_unread_for(viewer_id) && !self.marking.contains(&m.id))
            .map(|m| m.id.clone())
            .collect();
        self.marking.extend(to_mark.iter().cloned());
        Some(to_mark)
    }

    /// Stale data stays on screen.
    pub fn fail_fetch(&mut self, ticket: &ThreadTicket) {
        if self.is_current(ticket) {
            self.loading = false;
        }
    }

    /// Server accepted the mark-read request.
    pub fn confirm_read(&mut self, ids: &[String]) {
        for m in self.messages.iter_mut().filter(|m| ids.contains(&m.id)) {
            m.is_read = true;
        }
        for id in ids {
            self.marking.remove(id);
        }
    }

    /// Mark-read failed: the ids become eligible again on the next fetch.
    pub fn retry_read(&mut self, ids: &[String]) {
        for id in ids {
            self.marking.remove(id);
        }
    }

    pub fn begin_send(&mut self) -> Result<SendTicket, AppError> {
        if self.sending {
            return Err(AppError::InFlight { action: "sending" });
        }
        let key = self.selected.clone().ok_or(AppError::NoConversationSelected)?;
        if !key.is_complete() {
            return Err(AppError::IncompleteConversation);
        }
        if self.compose.trim().is_empty() {
            return Err(AppError::empty_field("message"));
        }
        self.sending = true;
        self.send_error = None;
        let request = SendMessageRequest {
            property_id: key.property_id.clone(),
            receiver_id: key.other_user_id.clone(),
            message: self.compose.clone(),
        };
        Ok(SendTicket { key, request })
    }

    /// On success appends the server's record (once) and clears the compose
    /// box; on failure keeps the compose text and records an inline error.
    /// Returns whether the message was appended.
    pub fn finish_send(&mut self, ticket: &SendTicket, result: Result<Message, AppError>) -> bool {
        self.sending = false;
        match result {
            Ok(message) => {
                self.compose.clear();
                self.send_error = None;
                if self.selected.as_ref() != Some(&ticket.key) {
                    return false;
                }
                if self.messages.iter().any(|m| m.id == message.id) {
                    return false;
                }
                self.messages.push(message);
                // a fetch issued before this send would not contain it
                self.generation += 1;
                self.loading = false;
                self.scroll_revision += 1;
                true
            }
            Err(e) => {
                self.send_error = Some(format!("Failed to send message: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(id: &str, from: &str, to: &str, read: bool) -> Message {
        Message {
            id: id.into(),
            property_id: "p1".into(),
            sender_id: from.into(),
            receiver_id: to.into(),
            message: format!("text {id}"),
            is_read: read,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    fn key(p: &str, u: &str) -> ConversationKey {
        ConversationKey::new(p, u)
    }

    #[test]
    fn incomplete_selection_is_refused_without_fetch() {
        let mut t = ThreadState::default();
        assert_eq!(t.select(key("", "u2")), Err(AppError::IncompleteConversation));
        assert_eq!(t.selected(), None);
        assert!(t.begin_fetch().is_none());
    }

    #[test]
    fn late_response_for_previous_selection_is_ignored() {
        let mut t = ThreadState::default();
        t.select(key("pA", "u2")).unwrap();
        let a = t.begin_fetch().unwrap();
        t.select(key("pB", "u3")).unwrap();
        let b = t.begin_fetch().unwrap();

        assert!(t.apply_fetch(&b, vec![msg("b1", "u3", "u1", true)], "u1").is_some());
        assert!(t.apply_fetch(&a, vec![msg("a1", "u2", "u1", true)], "u1").is_none());
        assert_eq!(t.messages().len(), 1);
        assert_eq!(t.messages()[0].id, "b1");
    }

    #[test]
    fn only_unread_messages_addressed_to_viewer_are_marked() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        let ticket = t.begin_fetch().unwrap();
        let ids = t
            .apply_fetch(
                &ticket,
                vec![
                    msg("m1", "u2", "u1", false),
                    msg("m2", "u1", "u2", false),
                    msg("m3", "u2", "u1", true),
                ],
                "u1",
            )
            .unwrap();
        assert_eq!(ids, vec!["m1".to_string()]);

        // polled again before the server caught up: not re-issued
        let ticket = t.begin_fetch().unwrap();
        let ids = t.apply_fetch(&ticket, vec![msg("m1", "u2", "u1", false)], "u1").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn read_flag_never_reverts() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        let ticket = t.begin_fetch().unwrap();
        let ids = t.apply_fetch(&ticket, vec![msg("m1", "u2", "u1", false)], "u1").unwrap();
        t.confirm_read(&ids);
        assert!(t.messages()[0].is_read);

        let ticket = t.begin_fetch().unwrap();
        t.apply_fetch(&ticket, vec![msg("m1", "u2", "u1", false)], "u1");
        assert!(t.messages()[0].is_read);
    }

    #[test]
    fn failed_mark_read_is_retried() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        let ticket = t.begin_fetch().unwrap();
        let ids = t.apply_fetch(&ticket, vec![msg("m1", "u2", "u1", false)], "u1").unwrap();
        t.retry_read(&ids);

        let ticket = t.begin_fetch().unwrap();
        let again = t.apply_fetch(&ticket, vec![msg("m1", "u2", "u1", false)], "u1").unwrap();
        assert_eq!(again, ids);
    }

    #[test]
    fn send_success_appends_once_and_clears_compose() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        t.compose = "Hello there".into();
        let ticket = t.begin_send().unwrap();
        assert_eq!(ticket.request.receiver_id, "u2");
        assert!(t.sending);

        let before = t.scroll_revision;
        assert!(t.finish_send(&ticket, Ok(msg("s1", "u1", "u2", false))));
        assert_eq!(t.messages().len(), 1);
        assert_eq!(t.compose, "");
        assert!(!t.sending);
        assert!(t.scroll_revision > before);
    }

    #[test]
    fn send_failure_keeps_compose_and_thread() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        t.compose = "Hello".into();
        let ticket = t.begin_send().unwrap();
        assert!(!t.finish_send(&ticket, Err(AppError::Network("offline".into()))));
        assert_eq!(t.messages().len(), 0);
        assert_eq!(t.compose, "Hello");
        assert!(t.send_error.as_deref().unwrap().starts_with("Failed to send message"));
    }

    #[test]
    fn blank_compose_or_no_selection_cannot_send() {
        let mut t = ThreadState::default();
        t.compose = "hi".into();
        assert_eq!(t.begin_send().unwrap_err(), AppError::NoConversationSelected);
        t.select(key("p1", "u2")).unwrap();
        t.compose = "   ".into();
        assert_eq!(t.begin_send().unwrap_err(), AppError::empty_field("message"));
        assert!(!t.sending);
    }

    #[test]
    fn send_invalidates_in_flight_fetch() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        let fetch = t.begin_fetch().unwrap();
        t.compose = "new".into();
        let send = t.begin_send().unwrap();
        t.finish_send(&send, Ok(msg("s1", "u1", "u2", false)));

        assert!(t.apply_fetch(&fetch, vec![], "u1").is_none());
        assert_eq!(t.messages().len(), 1);
    }

    #[test]
    fn unchanged_refetch_does_not_scroll() {
        let mut t = ThreadState::default();
        t.select(key("p1", "u2")).unwrap();
        let ticket = t.begin_fetch().unwrap();
        let m = msg("m1", "u1", "u2", false);
        t.apply_fetch(&ticket, vec![m.clone()], "u1");
        let rev = t.scroll_revision;

        let ticket = t.begin_fetch().unwrap();
        t.apply_fetch(&ticket, vec![m], "u1");
        assert_eq!(t.scroll_revision, rev);
    }
}
