//! Owner guard for the "contact owner" and "schedule visit" entry points.
//!
//! The check runs on every invocation against whoever is signed in at that
//! moment; nothing about the outcome is cached on the listing.

use tracing::info;

use crate::errors::AppError;
use crate::models::{ConversationKey, Property, User};

/// Text placed in the compose box when a visit is requested.
pub const VISIT_PREFILL: &str = "I am willing to visit your site";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactIntent {
    Message,
    ScheduleVisit,
}

impl ContactIntent {
    fn refused_action(self) -> &'static str {
        match self {
            ContactIntent::Message => "contact yourself on",
            ContactIntent::ScheduleVisit => "schedule a visit to",
        }
    }
}

/// Everything the chat view needs to open a thread about a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub property_id: String,
    pub property_title: String,
    pub property_image: Option<String>,
    pub owner_id: String,
    /// Initial compose text.
    pub prefill: Option<String>,
}

impl ChatTarget {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(&self.property_id, &self.owner_id)
    }
}

pub fn is_owner(viewer: Option<&User>, property: &Property) -> bool {
    viewer.is_some_and(|u| u.id == property.user_id)
}

/// Decides whether `viewer` may start a conversation about `property`.
///
/// Signed-out viewers get [`AppError::SignInRequired`]; owners get
/// [`AppError::OwnProperty`]. Neither outcome involves the network.
pub fn check_contact(
    viewer: Option<&User>,
    property: &Property,
    intent: ContactIntent,
) -> Result<ChatTarget, AppError> {
    let Some(user) = viewer else {
        return Err(AppError::SignInRequired);
    };
    if user.id == property.user_id {
        info!("Blocked {intent:?} by owner {} on property {}", user.id, property.id);
        return Err(AppError::OwnProperty { action: intent.refused_action() });
    }
    Ok(ChatTarget {
        property_id: property.id.clone(),
        property_title: property.title.clone(),
        property_image: property.images.first().cloned(),
        owner_id: property.user_id.clone(),
        prefill: match intent {
            ContactIntent::Message => None,
            ContactIntent::ScheduleVisit => Some(VISIT_PREFILL.to_string()),
        },
    })
}
