use serde::Deserialize;
use thiserror::Error;

/// Top-level client error.
/// All variants carry a human-readable message suitable for an inline banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // ── HTTP errors ──────────────────────────────────────────────────────────
    #[error("{detail}")]
    Unauthorized { detail: String },

    #[error("Server error ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Decode(String),

    // ── Local storage ────────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' must be a whole number (got '{value}')")]
    InvalidNumber { field_name: String, value: String },

    #[error("Phone number must be between 10-15 digits")]
    InvalidPhone,

    // ── Conversation errors ──────────────────────────────────────────────────
    #[error("Conversation is missing its property or counterpart")]
    IncompleteConversation,

    #[error("No conversation selected")]
    NoConversationSelected,

    #[error("Still {action}, please wait")]
    InFlight { action: &'static str },

    // ── Business rules ───────────────────────────────────────────────────────
    #[error("Please log in to continue")]
    SignInRequired,

    #[error("You cannot {action} your own property!")]
    OwnProperty { action: &'static str },
}

/// FastAPI error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl AppError {
    pub fn empty_field(field_name: impl Into<String>) -> Self {
        AppError::EmptyField { field_name: field_name.into() }
    }

    /// Maps a non-success HTTP response to an error, preferring the server's
    /// `detail` text when the body carries one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| match b.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.trim().to_string()
                }
            });

        if status == 401 {
            AppError::Unauthorized { detail }
        } else {
            AppError::Rejected { status, detail }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. } | AppError::SignInRequired)
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. } | AppError::InvalidNumber { .. } | AppError::InvalidPhone
        )
    }

    pub fn is_business_rule(&self) -> bool {
        matches!(self, AppError::OwnProperty { .. })
    }

    /// Failures worth retrying as-is: the request never reached a verdict.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Text for an inline auth form banner. The server's detail wins; anything
    /// that is not a server verdict falls back to `fallback`.
    pub fn form_message(&self, fallback: &str) -> String {
        match self {
            AppError::Unauthorized { detail } | AppError::Rejected { detail, .. } => detail.clone(),
            e if e.is_validation() => e.to_string(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
