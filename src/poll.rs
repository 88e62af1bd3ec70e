//! Periodic refresh of the unread badge and the open thread.
//!
//! Timers come from a [`Scheduler`]; dropping the handle it returns cancels
//! the timer, so a [`Poller`] owned by a view stops polling when the view
//! goes away.

use std::time::Duration;

use tracing::debug;

use crate::config::ClientConfig;
use crate::models::ConversationKey;

pub trait Scheduler {
    /// Cancels the timer when dropped.
    type Handle;

    fn every(&self, period: Duration, tick: Box<dyn FnMut()>) -> Self::Handle;
}

pub struct Poller<S: Scheduler> {
    scheduler: S,
    unread_period: Duration,
    thread_period: Duration,
    unread: Option<S::Handle>,
    thread: Option<(ConversationKey, S::Handle)>,
}

impl<S: Scheduler> Poller<S> {
    pub fn new(scheduler: S, config: &ClientConfig) -> Self {
        Self {
            scheduler,
            unread_period: config.unread_poll_interval,
            thread_period: config.thread_poll_interval,
            unread: None,
            thread: None,
        }
    }

    /// Starts the badge timer for a signed-in session, replacing any
    /// previous one.
    pub fn start_session(&mut self, tick: impl FnMut() + 'static) {
        debug!("Polling unread count every {:?}", self.unread_period);
        self.unread = Some(self.scheduler.every(self.unread_period, Box::new(tick)));
    }

    pub fn is_session_active(&self) -> bool {
        self.unread.is_some()
    }

    /// Polls the thread for `key`. Watching the key already watched keeps the
    /// running timer; any other key replaces it.
    pub fn watch_thread(&mut self, key: ConversationKey, tick: impl FnMut() + 'static) {
        if self.watched_thread() == Some(&key) {
            return;
        }
        debug!(
            "Polling thread for property {} every {:?}",
            key.property_id, self.thread_period
        );
        // old timer is cancelled before the new one starts
        self.thread = None;
        let handle = self.scheduler.every(self.thread_period, Box::new(tick));
        self.thread = Some((key, handle));
    }

    pub fn watched_thread(&self) -> Option<&ConversationKey> {
        self.thread.as_ref().map(|(key, _)| key)
    }

    pub fn stop_thread(&mut self) {
        self.thread = None;
    }

    /// Sign-out or teardown: nothing keeps running.
    pub fn stop(&mut self) {
        self.thread = None;
        self.unread = None;
    }
}
