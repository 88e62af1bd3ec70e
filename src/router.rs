use tracing::debug;

use crate::errors::AppError;
use crate::guard::{check_contact, ChatTarget, ContactIntent};
use crate::models::{Property, User};
use crate::session::SessionPhase;

/// Top-level views. Exactly one is current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Home,
    Login,
    Register,
    PostListing,
    MyListings,
    Chat,
    Profile,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Login,
        View::Register,
        View::PostListing,
        View::MyListings,
        View::Chat,
        View::Profile,
    ];

    pub fn requires_auth(self) -> bool {
        matches!(self, View::PostListing | View::MyListings | View::Chat | View::Profile)
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Login",
            View::Register => "Register",
            View::PostListing => "Post Property",
            View::MyListings => "My Properties",
            View::Chat => "Messages",
            View::Profile => "Profile",
        }
    }
}

/// What to draw: a view, or the spinner while the session restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Ready(View),
}

/// Selects the current view and enforces the auth guard on every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Router {
    current: View,
    chat_target: Option<ChatTarget>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn chat_target(&self) -> Option<&ChatTarget> {
        self.chat_target.as_ref()
    }

    /// Consumes the pending chat target once the chat view has picked it up.
    pub fn take_chat_target(&mut self) -> Option<ChatTarget> {
        self.chat_target.take()
    }

    /// Enters `view`, redirecting protected views to login when signed out.
    /// Returns the view actually entered.
    pub fn navigate(&mut self, view: View, signed_in: bool) -> View {
        let resolved = match view {
            v if v.requires_auth() && !signed_in => View::Login,
            View::Login | View::Register if signed_in => View::Home,
            v => v,
        };
        if resolved != view {
            debug!("Redirecting {view:?} -> {resolved:?}");
        }
        if resolved != View::Chat {
            self.chat_target = None;
        }
        self.current = resolved;
        resolved
    }

    pub fn signed_in(&mut self) {
        self.current = View::Home;
    }

    pub fn signed_out(&mut self) {
        self.chat_target = None;
        if self.current.requires_auth() {
            self.current = View::Home;
        }
    }

    /// Runs the owner guard and, when it passes, opens the chat view on the
    /// listing. A signed-out viewer is sent to login; an owner stays put.
    pub fn contact(
        &mut self,
        viewer: Option<&User>,
        property: &Property,
        intent: ContactIntent,
    ) -> Result<(), AppError> {
        match check_contact(viewer, property, intent) {
            Ok(target) => {
                self.navigate(View::Chat, true);
                self.chat_target = Some(target);
                Ok(())
            }
            Err(AppError::SignInRequired) => {
                self.navigate(View::Login, false);
                Err(AppError::SignInRequired)
            }
            Err(e) => Err(e),
        }
    }

    /// Screen for the current session phase. The guard is re-applied here so a
    /// view entered before the session settled still redirects.
    pub fn screen(&self, phase: &SessionPhase) -> Screen {
        match phase {
            SessionPhase::Restoring => Screen::Loading,
            SessionPhase::SignedOut if self.current.requires_auth() => Screen::Ready(View::Login),
            SessionPhase::SignedIn(_) if matches!(self.current, View::Login | View::Register) => {
                Screen::Ready(View::Home)
            }
            _ => Screen::Ready(self.current),
        }
    }
}
