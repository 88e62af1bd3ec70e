use tracing::{debug, info, warn};

use crate::api::RentalApi;
use crate::errors::AppError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::state::StateHandle;
use crate::storage::{Storage, TOKEN_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// A persisted token was found and `/auth/me` has not answered yet.
    Restoring,
    SignedOut,
    SignedIn(User),
}

/// Authenticated identity plus bearer credential. The token persists across
/// reloads; the identity lives only in memory and is re-fetched on restore.
pub struct SessionStore {
    phase: SessionPhase,
    token: Option<String>,
    storage: Box<dyn Storage>,
}

impl SessionStore {
    pub fn open(storage: impl Storage + 'static) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let phase = if token.is_some() {
            SessionPhase::Restoring
        } else {
            SessionPhase::SignedOut
        };
        Self { phase, token, storage: Box::new(storage) }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_restoring(&self) -> bool {
        self.phase == SessionPhase::Restoring
    }

    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            SessionPhase::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    /// Bearer token, only while signed in.
    pub fn token(&self) -> Option<&str> {
        self.user().and(self.token.as_deref())
    }

    /// Identity and token together, for views that act on the user's behalf.
    pub fn credentials(&self) -> Option<(User, String)> {
        Some((self.user()?.clone(), self.token.clone()?))
    }

    /// Token awaiting validation, if a restore is pending.
    pub fn pending_restore(&self) -> Option<String> {
        if self.is_restoring() {
            self.token.clone()
        } else {
            None
        }
    }

    pub fn finish_restore(&mut self, result: Result<User, AppError>) {
        if !self.is_restoring() {
            return;
        }
        match result {
            Ok(user) => {
                info!("Session restored for {}", user.email);
                self.phase = SessionPhase::SignedIn(user);
            }
            Err(e) if e.is_auth() => {
                warn!("Stored token rejected, clearing session: {e}");
                self.clear();
            }
            Err(e) => {
                // keep the persisted token; the next load retries it
                warn!("Could not restore session: {e}");
                self.token = None;
                self.phase = SessionPhase::SignedOut;
            }
        }
    }

    pub fn sign_in(&mut self, auth: AuthResponse) {
        if let Err(e) = self.storage.set(TOKEN_KEY, &auth.access_token) {
            warn!("Token not persisted, session will not survive a reload: {e}");
        }
        info!("Signed in as {}", auth.user.email);
        self.token = Some(auth.access_token);
        self.phase = SessionPhase::SignedIn(auth.user);
    }

    /// Clears both the persisted credential and the in-memory identity.
    pub fn sign_out(&mut self) {
        info!("Signed out");
        self.clear();
    }

    fn clear(&mut self) {
        self.storage.remove(TOKEN_KEY);
        self.token = None;
        self.phase = SessionPhase::SignedOut;
    }
}

impl RegisterRequest {
    /// Client-side checks mirroring the server's rules, run before any request.
    /// The phone number is normalised to its digits.
    pub fn validated(&self) -> Result<RegisterRequest, AppError> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("password", &self.password)] {
            if value.trim().is_empty() {
                return Err(AppError::empty_field(field));
            }
        }
        let digits: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if !(10..=15).contains(&digits.len()) {
            return Err(AppError::InvalidPhone);
        }
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            name: self.name.trim().to_string(),
            phone: digits,
            password: self.password.clone(),
        })
    }
}

/// Drives session lifecycle calls against the backend.
#[derive(Clone)]
pub struct SessionController<A, H> {
    api: A,
    session: H,
}

impl<A, H> SessionController<A, H>
where
    A: RentalApi,
    H: StateHandle<SessionStore>,
{
    pub fn new(api: A, session: H) -> Self {
        Self { api, session }
    }

    /// Validates a persisted token, if any. Resolves the loading phase.
    pub async fn restore(&self) {
        let Some(token) = self.session.read(|s| s.pending_restore()).flatten() else {
            return;
        };
        debug!("Restoring session from stored token");
        let result = self.api.me(&token).await;
        self.session.write(|s| s.finish_restore(result));
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), AppError> {
        if email.trim().is_empty() {
            return Err(AppError::empty_field("email"));
        }
        if password.is_empty() {
            return Err(AppError::empty_field("password"));
        }
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let auth = self.api.login(&request).await.map_err(|e| {
            warn!("Login failed: {e}");
            e
        })?;
        self.session.write(|s| s.sign_in(auth));
        Ok(())
    }

    pub async fn register(&self, account: &RegisterRequest) -> Result<(), AppError> {
        let request = account.validated()?;
        let auth = self.api.register(&request).await.map_err(|e| {
            warn!("Registration failed: {e}");
            e
        })?;
        self.session.write(|s| s.sign_in(auth));
        Ok(())
    }

    pub fn logout(&self) {
        self.session.write(|s| s.sign_out());
    }
}
