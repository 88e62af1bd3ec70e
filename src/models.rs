use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Accounts ──────────────────────────────────────────────────────────────────

/// Public identity returned by `/auth/login`, `/auth/register` and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

// ── Listings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Room,
    House,
    Pg,
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub const SEARCHABLE: [PropertyType; 3] = [PropertyType::Room, PropertyType::House, PropertyType::Pg];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Room => "room",
            PropertyType::House => "house",
            PropertyType::Pg => "pg",
            PropertyType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Room => "Room",
            PropertyType::House => "House",
            PropertyType::Pg => "PG",
            PropertyType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "room" => Some(PropertyType::Room),
            "house" => Some(PropertyType::House),
            "pg" => Some(PropertyType::Pg),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub rent: i64,
    pub deposit: i64,
    pub location: String,
    pub city: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_available() -> bool {
    true
}

/// How many amenities a listing card shows before collapsing the rest.
pub const AMENITY_PREVIEW: usize = 3;

impl Property {
    /// First image as something an `<img src>` accepts. Images are stored as
    /// either full data URLs or bare base64, which is treated as JPEG.
    pub fn cover_image(&self) -> Option<String> {
        self.images.first().map(|img| image_src(img))
    }

    /// Leading amenities plus the number left out.
    pub fn amenity_preview(&self) -> (&[String], usize) {
        let shown = self.amenities.len().min(AMENITY_PREVIEW);
        (&self.amenities[..shown], self.amenities.len() - shown)
    }
}

pub fn image_src(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

/// Body of `POST /properties`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub rent: i64,
    pub deposit: i64,
    pub location: String,
    pub city: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// Identity of a thread: one property, one counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub property_id: String,
    pub other_user_id: String,
}

impl ConversationKey {
    pub fn new(property_id: impl Into<String>, other_user_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            other_user_id: other_user_id.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.property_id.trim().is_empty() && !self.other_user_id.trim().is_empty()
    }
}

/// Matches the backend `ConversationSummary` model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub property_id: String,
    pub property_title: String,
    #[serde(default)]
    pub property_image: Option<String>,
    pub other_user_id: String,
    pub other_user_name: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(with = "timestamp")]
    pub last_message_time: DateTime<Utc>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub is_sender: bool,
}

impl Conversation {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(&self.property_id, &self.other_user_id)
    }
}

/// Matches the backend `Chat` model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub property_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, with = "timestamp::option")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_unread_for(&self, user_id: &str) -> bool {
        self.receiver_id == user_id && !self.is_read
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    pub property_id: String,
    pub receiver_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadRequest {
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u32,
}

/// Serde helpers for backend timestamps. The server writes naive UTC datetimes
/// (`2024-05-01T10:00:00.123456`); RFC 3339 with an offset is accepted too.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_some(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_accepts_naive_backend_timestamps() {
        let json = r#"{
            "id": "m1",
            "property_id": "p1",
            "sender_id": "u2",
            "receiver_id": "u1",
            "message": "Is it still available?",
            "is_read": false,
            "read_at": null,
            "created_at": "2024-05-01T10:00:00.123456"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.created_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
        assert!(msg.is_unread_for("u1"));
        assert!(!msg.is_unread_for("u2"));
    }

    #[test]
    fn conversation_accepts_rfc3339_and_missing_image() {
        let json = r#"{
            "property_id": "p1",
            "property_title": "Sunny room",
            "other_user_id": "u2",
            "other_user_name": "Asha",
            "last_message": "hi",
            "last_message_time": "2024-05-01T10:00:00Z",
            "unread_count": 2,
            "is_sender": false
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.property_image, None);
        assert_eq!(conv.key(), ConversationKey::new("p1", "u2"));
    }

    #[test]
    fn property_type_round_trips_lowercase_and_tolerates_unknown() {
        assert_eq!(serde_json::to_string(&PropertyType::Pg).unwrap(), "\"pg\"");
        let t: PropertyType = serde_json::from_str("\"villa\"").unwrap();
        assert_eq!(t, PropertyType::Other);
        assert_eq!(PropertyType::parse(" House "), Some(PropertyType::House));
    }

    #[test]
    fn cover_image_wraps_bare_base64() {
        assert_eq!(image_src("abcd"), "data:image/jpeg;base64,abcd");
        assert_eq!(image_src("data:image/png;base64,abcd"), "data:image/png;base64,abcd");
    }

    #[test]
    fn amenity_preview_collapses_tail() {
        let json = r#"{
            "id": "p1", "user_id": "u1", "title": "t", "description": "d",
            "property_type": "room", "rent": 5000, "deposit": 10000,
            "location": "Andheri", "city": "Mumbai",
            "amenities": ["wifi", "ac", "parking", "gym", "lift"]
        }"#;
        let p: Property = serde_json::from_str(json).unwrap();
        let (shown, hidden) = p.amenity_preview();
        assert_eq!(shown, ["wifi", "ac", "parking"]);
        assert_eq!(hidden, 2);
        assert!(p.available);
        assert_eq!(p.cover_image(), None);
    }

    #[test]
    fn incomplete_keys_are_detected() {
        assert!(!ConversationKey::new("", "u2").is_complete());
        assert!(!ConversationKey::new("p1", " ").is_complete());
        assert!(ConversationKey::new("p1", "u2").is_complete());
    }
}
