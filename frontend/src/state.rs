use std::time::Duration;

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;

use findmeroom::catalog::{CatalogController, CatalogState};
use findmeroom::chat::{refresh_unread, ChatController, ChatState, UnreadCounter};
use findmeroom::city::CityStore;
use findmeroom::errors::AppError;
use findmeroom::guard::ContactIntent;
use findmeroom::listings::ListingsController;
use findmeroom::models::{Property, User};
use findmeroom::poll::Scheduler;
use findmeroom::router::{Router, View};
use findmeroom::session::{SessionController, SessionStore};
use findmeroom::StateHandle;

use crate::api::GlooApi;
use crate::storage::WebStorage;

/// Lets core controllers drive a signal. Reads are untracked; a disposed
/// signal answers `None` so late responses are dropped.
pub struct SignalHandle<T: Send + Sync + 'static>(RwSignal<T>);

impl<T: Send + Sync + 'static> SignalHandle<T> {
    pub fn new(signal: RwSignal<T>) -> Self {
        Self(signal)
    }
}

impl<T: Send + Sync + 'static> Clone for SignalHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for SignalHandle<T> {}

impl<T: Send + Sync + 'static> StateHandle<T> for SignalHandle<T> {
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.0.try_with_untracked(f)
    }

    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

/// Browser timers. Dropping the returned [`Interval`] clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    type Handle = Interval;

    fn every(&self, period: Duration, mut tick: Box<dyn FnMut()>) -> Interval {
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        Interval::new(millis, move || tick())
    }
}

pub type ChatCtl = ChatController<GlooApi, SignalHandle<ChatState>, SignalHandle<UnreadCounter>>;
pub type CatalogCtl = CatalogController<GlooApi, SignalHandle<CatalogState>>;

/// Process-wide state, provided via Leptos context.
#[derive(Clone)]
pub struct AppState {
    pub api: GlooApi,
    pub session: RwSignal<SessionStore>,
    pub city: RwSignal<CityStore>,
    pub router: RwSignal<Router>,
    pub unread: RwSignal<UnreadCounter>,
    /// Blocking message shown above the current view.
    pub notice: RwSignal<Option<String>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let state = Self {
            api: GlooApi::from_env(),
            session: RwSignal::new(SessionStore::open(WebStorage)),
            city: RwSignal::new(CityStore::open(WebStorage)),
            router: RwSignal::new(Router::new()),
            unread: RwSignal::new(UnreadCounter::default()),
            notice: RwSignal::new(None),
        };
        provide_context(state.clone());
        state
    }

    pub fn session_controller(&self) -> SessionController<GlooApi, SignalHandle<SessionStore>> {
        SessionController::new(self.api.clone(), SignalHandle::new(self.session))
    }

    pub fn restore_session(&self) {
        let ctl = self.session_controller();
        spawn_local(async move { ctl.restore().await });
    }

    /// Tracked.
    pub fn user(&self) -> Option<User> {
        self.session.with(|s| s.user().cloned())
    }

    /// Tracked.
    pub fn is_signed_in(&self) -> bool {
        self.session.with(|s| s.is_signed_in())
    }

    pub fn navigate(&self, view: View) {
        let signed_in = self.session.with_untracked(|s| s.is_signed_in());
        self.notice.set(None);
        self.router.update(|r| {
            r.navigate(view, signed_in);
        });
    }

    pub fn signed_in(&self) {
        self.router.update(|r| r.signed_in());
        self.refresh_unread();
    }

    pub fn logout(&self) {
        self.session_controller().logout();
        self.unread.update(|u| u.reset());
        self.router.update(|r| r.signed_out());
    }

    /// Contact or schedule-visit on a listing. The owner guard runs against
    /// the viewer at the moment of the click.
    pub fn contact(&self, property: &Property, intent: ContactIntent) {
        let viewer = self.session.with_untracked(|s| s.user().cloned());
        let result = self
            .router
            .try_update(|r| r.contact(viewer.as_ref(), property, intent));
        match result {
            Some(Err(e)) if e.is_business_rule() => {
                log::info!("Contact refused: {e}");
                self.notice.set(Some(e.to_string()));
            }
            Some(Err(AppError::SignInRequired)) | Some(Ok(())) | None => {
                self.notice.set(None);
            }
            Some(Err(e)) => log::warn!("Contact failed: {e}"),
        }
    }

    pub fn refresh_unread(&self) {
        let Some(token) = self.session.with_untracked(|s| s.token().map(String::from)) else {
            return;
        };
        let api = self.api.clone();
        let unread = SignalHandle::new(self.unread);
        spawn_local(async move { refresh_unread(&api, &token, &unread).await });
    }

    pub fn chat_controller(&self, chat: RwSignal<ChatState>) -> Option<ChatCtl> {
        let (user, token) = self.session.with_untracked(|s| s.credentials())?;
        Some(ChatController::new(
            self.api.clone(),
            SignalHandle::new(chat),
            SignalHandle::new(self.unread),
            user,
            token,
        ))
    }

    pub fn catalog_controller(&self, catalog: RwSignal<CatalogState>) -> CatalogCtl {
        CatalogController::new(self.api.clone(), SignalHandle::new(catalog))
    }

    pub fn listings_controller(&self) -> Option<ListingsController<GlooApi>> {
        let token = self.session.with_untracked(|s| s.token().map(String::from))?;
        Some(ListingsController::new(self.api.clone(), token))
    }
}
