//! REST surface consumed by the client.
//!
//! [`RentalApi`] is the seam between view controllers and the network: the
//! browser shell implements it over `fetch`, tests implement it in memory.
//! Paths here are relative to [`crate::config::ClientConfig::api_base`].

use async_trait::async_trait;
use url::form_urlencoded;

use crate::catalog::PropertyFilter;
use crate::errors::AppError;
use crate::models::{
    AuthResponse, Conversation, ConversationKey, LoginRequest, Message, NewProperty, Property,
    RegisterRequest, SendMessageRequest, User,
};

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const ME: &str = "/auth/me";
pub const PROPERTIES: &str = "/properties";
pub const MY_PROPERTIES: &str = "/my-properties";
pub const CONVERSATIONS: &str = "/chat/conversations";
pub const SEND_MESSAGE: &str = "/chat";
pub const MARK_READ: &str = "/chat/mark-read";
pub const UNREAD_COUNT: &str = "/chat/unread-count";

/// `GET /properties?city&property_type&min_rent&max_rent`, empty filters omitted.
pub fn properties_query(filter: &PropertyFilter) -> String {
    let pairs = filter.query_pairs();
    if pairs.is_empty() {
        return PROPERTIES.to_string();
    }
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &pairs {
        query.append_pair(k, v);
    }
    format!("{PROPERTIES}?{}", query.finish())
}

/// `DELETE /properties/:id`
pub fn property_path(property_id: &str) -> String {
    format!("{PROPERTIES}/{}", encode_segment(property_id))
}

/// `GET /chat/:propertyId?other_user_id=`
pub fn thread_path(key: &ConversationKey) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("other_user_id", &key.other_user_id)
        .finish();
    format!("/chat/{}?{query}", encode_segment(&key.property_id))
}

fn encode_segment(segment: &str) -> String {
    // form encoding turns spaces into '+', which is wrong inside a path
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Every backend call the client makes. Calls that need a session take the
/// bearer token explicitly; the session store owns it.
#[async_trait(?Send)]
pub trait RentalApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, AppError>;

    async fn register(&self, account: &RegisterRequest) -> Result<AuthResponse, AppError>;

    async fn me(&self, token: &str) -> Result<User, AppError>;

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError>;

    async fn create_property(&self, token: &str, property: &NewProperty) -> Result<Property, AppError>;

    async fn delete_property(&self, token: &str, property_id: &str) -> Result<(), AppError>;

    async fn my_properties(&self, token: &str) -> Result<Vec<Property>, AppError>;

    async fn conversations(&self, token: &str) -> Result<Vec<Conversation>, AppError>;

    async fn thread(&self, token: &str, key: &ConversationKey) -> Result<Vec<Message>, AppError>;

    async fn send_message(&self, token: &str, request: &SendMessageRequest) -> Result<Message, AppError>;

    async fn mark_read(&self, token: &str, message_ids: &[String]) -> Result<(), AppError>;

    async fn unread_count(&self, token: &str) -> Result<u32, AppError>;
}
