use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use findmeroom::api::{self as paths, RentalApi};
use findmeroom::catalog::PropertyFilter;
use findmeroom::models::{
    AuthResponse, Conversation, ConversationKey, LoginRequest, MarkReadRequest, Message,
    NewProperty, Property, RegisterRequest, SendMessageRequest, UnreadCount, User,
};
use findmeroom::{AppError, ClientConfig};

/// Backend origin baked in at build time; empty means same origin.
const BACKEND_URL: Option<&str> = option_env!("FINDMEROOM_BACKEND_URL");

/// `fetch`-backed client for the REST backend.
#[derive(Debug, Clone)]
pub struct GlooApi {
    config: ClientConfig,
}

impl GlooApi {
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_backend_url(BACKEND_URL.unwrap_or_default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        Request::get(&self.config.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        Request::post(&self.config.url(path))
    }
}

fn bearer(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {token}"))
}

fn with_json<B: serde::Serialize>(builder: RequestBuilder, body: &B) -> Result<Request, AppError> {
    builder
        .json(body)
        .map_err(|e| AppError::Decode(format!("Serialize error: {e}")))
}

async fn dispatch(request: Request) -> Result<Response, AppError> {
    request
        .send()
        .await
        .map_err(|e| AppError::Network(format!("Network error: {e}")))
}

/// Reads the body once: non-2xx statuses become [`AppError::from_response`],
/// anything else is decoded as `T`.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    let body = resp
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Network error: {e}")))?;
    if !resp.ok() {
        return Err(AppError::from_response(resp.status(), &body));
    }
    serde_json::from_str(&body).map_err(|e| AppError::Decode(format!("Parse error: {e}")))
}

async fn expect_ok(resp: Response) -> Result<(), AppError> {
    if resp.ok() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::from_response(resp.status(), &body))
}

async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, AppError> {
    let request = builder
        .build()
        .map_err(|e| AppError::Network(format!("Network error: {e}")))?;
    read_json(dispatch(request).await?).await
}

#[async_trait(?Send)]
impl RentalApi for GlooApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, AppError> {
        let request = with_json(self.post(paths::LOGIN), credentials)?;
        read_json(dispatch(request).await?).await
    }

    async fn register(&self, account: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let request = with_json(self.post(paths::REGISTER), account)?;
        read_json(dispatch(request).await?).await
    }

    async fn me(&self, token: &str) -> Result<User, AppError> {
        fetch(bearer(self.get(paths::ME), token)).await
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        fetch(self.get(&paths::properties_query(filter))).await
    }

    async fn create_property(&self, token: &str, property: &NewProperty) -> Result<Property, AppError> {
        let request = with_json(bearer(self.post(paths::PROPERTIES), token), property)?;
        read_json(dispatch(request).await?).await
    }

    async fn delete_property(&self, token: &str, property_id: &str) -> Result<(), AppError> {
        let url = self.config.url(&paths::property_path(property_id));
        let request = bearer(Request::delete(&url), token)
            .build()
            .map_err(|e| AppError::Network(format!("Network error: {e}")))?;
        expect_ok(dispatch(request).await?).await
    }

    async fn my_properties(&self, token: &str) -> Result<Vec<Property>, AppError> {
        fetch(bearer(self.get(paths::MY_PROPERTIES), token)).await
    }

    async fn conversations(&self, token: &str) -> Result<Vec<Conversation>, AppError> {
        fetch(bearer(self.get(paths::CONVERSATIONS), token)).await
    }

    async fn thread(&self, token: &str, key: &ConversationKey) -> Result<Vec<Message>, AppError> {
        fetch(bearer(self.get(&paths::thread_path(key)), token)).await
    }

    async fn send_message(&self, token: &str, request: &SendMessageRequest) -> Result<Message, AppError> {
        let request = with_json(bearer(self.post(paths::SEND_MESSAGE), token), request)?;
        read_json(dispatch(request).await?).await
    }

    async fn mark_read(&self, token: &str, message_ids: &[String]) -> Result<(), AppError> {
        let body = MarkReadRequest { message_ids: message_ids.to_vec() };
        let request = with_json(bearer(self.post(paths::MARK_READ), token), &body)?;
        expect_ok(dispatch(request).await?).await
    }

    async fn unread_count(&self, token: &str) -> Result<u32, AppError> {
        let count: UnreadCount = fetch(bearer(self.get(paths::UNREAD_COUNT), token)).await?;
        Ok(count.unread_count)
    }
}
