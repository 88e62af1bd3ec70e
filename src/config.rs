use std::time::Duration;

/// Unread badge refresh period.
pub const DEFAULT_UNREAD_POLL: Duration = Duration::from_secs(5);
/// Open thread refresh period.
pub const DEFAULT_THREAD_POLL: Duration = Duration::from_secs(10);

const MIN_POLL: Duration = Duration::from_secs(1);

/// Client configuration: where the REST API lives and how often to poll it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, without a trailing slash.
    pub api_base: String,
    pub unread_poll_interval: Duration,
    pub thread_poll_interval: Duration,
}

impl ClientConfig {
    /// Builds the API base from the backend origin: trailing slashes are
    /// dropped and `/api` appended. An empty origin means same-origin.
    pub fn from_backend_url(raw: &str) -> Self {
        let origin = raw.trim().trim_end_matches('/');
        Self {
            api_base: format!("{origin}/api"),
            unread_poll_interval: DEFAULT_UNREAD_POLL,
            thread_poll_interval: DEFAULT_THREAD_POLL,
        }
    }

    pub fn with_poll_intervals(mut self, unread: Duration, thread: Duration) -> Self {
        self.unread_poll_interval = unread.max(MIN_POLL);
        self.thread_poll_interval = thread.max(MIN_POLL);
        self
    }

    /// Absolute URL for an endpoint path such as `/chat/unread-count`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_backend_url("")
    }
}
