//! In-memory backend standing in for the REST server.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::oneshot;

use findmeroom::api::{self, RentalApi};
use findmeroom::catalog::PropertyFilter;
use findmeroom::models::{
    AuthResponse, Conversation, ConversationKey, LoginRequest, Message, NewProperty, Property,
    PropertyType, RegisterRequest, SendMessageRequest, User,
};
use findmeroom::AppError;

#[derive(Default)]
struct Backend {
    accounts: Vec<(User, String)>,
    properties: Vec<Property>,
    messages: Vec<Message>,
    calls: Vec<String>,
    next_id: u64,
    held_threads: HashMap<String, oneshot::Receiver<()>>,
    fail_send: bool,
    fail_mark_read: bool,
    offline: bool,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn viewer(&self, token: &str) -> Result<User, AppError> {
        self.accounts
            .iter()
            .map(|(u, _)| u)
            .find(|u| token == format!("token-{}", u.id))
            .cloned()
            .ok_or(AppError::Unauthorized { detail: "Invalid authentication credentials".into() })
    }

    fn user_name(&self, id: &str) -> String {
        self.accounts
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.name.clone())
            .unwrap_or_else(|| "Unknown".into())
    }
}

/// Cloning shares the same backend.
#[derive(Clone, Default)]
pub struct FakeApi {
    inner: Rc<RefCell<Backend>>,
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        email: format!("{id}@example.com"),
        name: name.into(),
    }
}

pub fn token_for(user: &User) -> String {
    format!("token-{}", user.id)
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, user: &User, password: &str) {
        self.inner.borrow_mut().accounts.push((user.clone(), password.into()));
    }

    pub fn add_property(&self, id: &str, owner: &str, city: &str, rent: i64) -> Property {
        let property = Property {
            id: id.into(),
            user_id: owner.into(),
            title: format!("Listing {id}"),
            description: "Bright and airy".into(),
            property_type: PropertyType::Room,
            rent,
            deposit: rent * 2,
            location: "Near station".into(),
            city: city.into(),
            images: vec![],
            amenities: vec!["wifi".into()],
            available: true,
            created_at: None,
            updated_at: None,
        };
        self.inner.borrow_mut().properties.push(property.clone());
        property
    }

    /// Stores a message as though the server had accepted it earlier.
    pub fn seed_message(&self, property_id: &str, from: &str, to: &str, text: &str) -> Message {
        let mut backend = self.inner.borrow_mut();
        let id = backend.next_id("m");
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + Duration::minutes(backend.messages.len() as i64);
        let message = Message {
            id,
            property_id: property_id.into(),
            sender_id: from.into(),
            receiver_id: to.into(),
            message: text.into(),
            is_read: false,
            read_at: None,
            created_at,
        };
        backend.messages.push(message.clone());
        message
    }

    /// The next thread fetch for `property_id` waits until the returned
    /// sender fires.
    pub fn hold_thread(&self, property_id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.borrow_mut().held_threads.insert(property_id.into(), rx);
        tx
    }

    pub fn fail_send(&self, fail: bool) {
        self.inner.borrow_mut().fail_send = fail;
    }

    pub fn fail_mark_read(&self, fail: bool) {
        self.inner.borrow_mut().fail_mark_read = fail;
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.inner.borrow().calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn stored_messages(&self) -> Vec<Message> {
        self.inner.borrow().messages.clone()
    }

    fn record(&self, call: String) -> Result<(), AppError> {
        let mut backend = self.inner.borrow_mut();
        backend.calls.push(call);
        if backend.offline {
            return Err(AppError::Network("Failed to fetch".into()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl RentalApi for FakeApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, AppError> {
        self.record(format!("POST {}", api::LOGIN))?;
        let backend = self.inner.borrow();
        backend
            .accounts
            .iter()
            .find(|(u, p)| u.email == credentials.email && *p == credentials.password)
            .map(|(u, _)| AuthResponse {
                access_token: token_for(u),
                token_type: Some("bearer".into()),
                user: u.clone(),
            })
            .ok_or(AppError::Unauthorized { detail: "Incorrect email or password".into() })
    }

    async fn register(&self, account: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.record(format!("POST {}", api::REGISTER))?;
        let mut backend = self.inner.borrow_mut();
        if backend.accounts.iter().any(|(u, _)| u.email == account.email) {
            return Err(AppError::Rejected { status: 400, detail: "Email already registered".into() });
        }
        let id = backend.next_id("u");
        let user = User {
            id,
            email: account.email.clone(),
            name: account.name.clone(),
        };
        backend.accounts.push((user.clone(), account.password.clone()));
        Ok(AuthResponse {
            access_token: token_for(&user),
            token_type: Some("bearer".into()),
            user,
        })
    }

    async fn me(&self, token: &str) -> Result<User, AppError> {
        self.record(format!("GET {}", api::ME))?;
        self.inner.borrow().viewer(token)
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        self.record(format!("GET {}", api::properties_query(filter)))?;
        let backend = self.inner.borrow();
        Ok(backend.properties.iter().filter(|p| admits(filter, p)).cloned().collect())
    }

    async fn create_property(&self, token: &str, property: &NewProperty) -> Result<Property, AppError> {
        self.record(format!("POST {}", api::PROPERTIES))?;
        let mut backend = self.inner.borrow_mut();
        let owner = backend.viewer(token)?;
        let id = backend.next_id("p");
        let created = Property {
            id,
            user_id: owner.id,
            title: property.title.clone(),
            description: property.description.clone(),
            property_type: property.property_type,
            rent: property.rent,
            deposit: property.deposit,
            location: property.location.clone(),
            city: property.city.clone(),
            images: property.images.clone(),
            amenities: property.amenities.clone(),
            available: true,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        backend.properties.push(created.clone());
        Ok(created)
    }

    async fn delete_property(&self, token: &str, property_id: &str) -> Result<(), AppError> {
        self.record(format!("DELETE {}", api::property_path(property_id)))?;
        let mut backend = self.inner.borrow_mut();
        let owner = backend.viewer(token)?;
        let before = backend.properties.len();
        backend.properties.retain(|p| !(p.id == property_id && p.user_id == owner.id));
        if backend.properties.len() == before {
            return Err(AppError::Rejected { status: 404, detail: "Property not found".into() });
        }
        Ok(())
    }

    async fn my_properties(&self, token: &str) -> Result<Vec<Property>, AppError> {
        self.record(format!("GET {}", api::MY_PROPERTIES))?;
        let backend = self.inner.borrow();
        let owner = backend.viewer(token)?;
        Ok(backend.properties.iter().filter(|p| p.user_id == owner.id).cloned().collect())
    }

    async fn conversations(&self, token: &str) -> Result<Vec<Conversation>, AppError> {
        self.record(format!("GET {}", api::CONVERSATIONS))?;
        let backend = self.inner.borrow();
        let viewer = backend.viewer(token)?;
        let mut summaries: Vec<Conversation> = Vec::new();
        for m in backend.messages.iter().filter(|m| m.sender_id == viewer.id || m.receiver_id == viewer.id) {
            let other = if m.sender_id == viewer.id { &m.receiver_id } else { &m.sender_id };
            let key = ConversationKey::new(&m.property_id, other);
            let unread = u32::from(m.is_unread_for(&viewer.id));
            if let Some(existing) = summaries.iter_mut().find(|c| c.key() == key) {
                existing.last_message = m.message.clone();
                existing.last_message_time = m.created_at;
                existing.is_sender = m.sender_id == viewer.id;
                existing.unread_count += unread;
                continue;
            }
            let title = backend
                .properties
                .iter()
                .find(|p| p.id == m.property_id)
                .map(|p| p.title.clone())
                .unwrap_or_default();
            summaries.push(Conversation {
                property_id: m.property_id.clone(),
                property_title: title,
                property_image: None,
                other_user_id: other.clone(),
                other_user_name: backend.user_name(other),
                last_message: m.message.clone(),
                last_message_time: m.created_at,
                unread_count: unread,
                is_sender: m.sender_id == viewer.id,
            });
        }
        summaries.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
        Ok(summaries)
    }

    async fn thread(&self, token: &str, key: &ConversationKey) -> Result<Vec<Message>, AppError> {
        self.record(format!("GET {}", api::thread_path(key)))?;
        let gate = self.inner.borrow_mut().held_threads.remove(&key.property_id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let backend = self.inner.borrow();
        let viewer = backend.viewer(token)?;
        Ok(backend
            .messages
            .iter()
            .filter(|m| m.property_id == key.property_id)
            .filter(|m| {
                (m.sender_id == viewer.id && m.receiver_id == key.other_user_id)
                    || (m.sender_id == key.other_user_id && m.receiver_id == viewer.id)
            })
            .cloned()
            .collect())
    }

    async fn send_message(&self, token: &str, request: &SendMessageRequest) -> Result<Message, AppError> {
        self.record(format!("POST {}", api::SEND_MESSAGE))?;
        let mut backend = self.inner.borrow_mut();
        if backend.fail_send {
            return Err(AppError::Rejected { status: 500, detail: "Internal Server Error".into() });
        }
        let viewer = backend.viewer(token)?;
        let id = backend.next_id("m");
        let message = Message {
            id,
            property_id: request.property_id.clone(),
            sender_id: viewer.id,
            receiver_id: request.receiver_id.clone(),
            message: request.message.clone(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        backend.messages.push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, token: &str, message_ids: &[String]) -> Result<(), AppError> {
        self.record(format!("POST {} {}", api::MARK_READ, message_ids.join(",")))?;
        let mut backend = self.inner.borrow_mut();
        if backend.fail_mark_read {
            return Err(AppError::Network("connection reset".into()));
        }
        let viewer = backend.viewer(token)?;
        for m in backend.messages.iter_mut() {
            if message_ids.contains(&m.id) && m.receiver_id == viewer.id {
                m.is_read = true;
                m.read_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn unread_count(&self, token: &str) -> Result<u32, AppError> {
        self.record(format!("GET {}", api::UNREAD_COUNT))?;
        let backend = self.inner.borrow();
        let viewer = backend.viewer(token)?;
        Ok(backend.messages.iter().filter(|m| m.is_unread_for(&viewer.id)).count() as u32)
    }
}

/// What a correct backend returns for `filter`. City matching is a
/// case-insensitive substring, as the server does it.
fn admits(filter: &PropertyFilter, property: &Property) -> bool {
    let city = filter.city.trim().to_lowercase();
    (city.is_empty() || property.city.to_lowercase().contains(&city))
        && filter.property_type.is_none_or(|t| property.property_type == t)
        && filter.min_rent.is_none_or(|min| property.rent >= min)
        && filter.max_rent.is_none_or(|max| property.rent <= max)
}
