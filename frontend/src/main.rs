mod api;
mod components;
mod state;
mod storage;

use leptos::prelude::*;
use leptos::mount::mount_to_body;

use findmeroom::router::{Screen, View};

use components::auth::{LoginPage, RegisterPage};
use components::catalog::CatalogPage;
use components::chat::ChatPage;
use components::header::Header;
use components::listings::{MyListingsPage, PostListingPage};
use components::profile::ProfilePage;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Validate any stored token before the first real view
    state.restore_session();

    let screen = {
        let state = state.clone();
        Memo::new(move |_| {
            state
                .session
                .with(|s| state.router.with(|r| r.screen(s.phase())))
        })
    };

    view! {
        <div class="app-container">
            <Header />
            <NoticeBanner />
            <main class="content">
                {move || match screen.get() {
                    Screen::Loading => view! {
                        <div class="loading">"Loading..."</div>
                    }.into_any(),
                    Screen::Ready(View::Home) => view! { <CatalogPage /> }.into_any(),
                    Screen::Ready(View::Login) => view! { <LoginPage /> }.into_any(),
                    Screen::Ready(View::Register) => view! { <RegisterPage /> }.into_any(),
                    Screen::Ready(View::PostListing) => view! { <PostListingPage /> }.into_any(),
                    Screen::Ready(View::MyListings) => view! { <MyListingsPage /> }.into_any(),
                    Screen::Ready(View::Chat) => view! { <ChatPage /> }.into_any(),
                    Screen::Ready(View::Profile) => view! { <ProfilePage /> }.into_any(),
                }}
            </main>
        </div>
    }
}

/// Refusals such as contacting one's own listing.
#[component]
fn NoticeBanner() -> impl IntoView {
    let state = expect_context::<AppState>();
    let notice = state.notice;

    move || {
        notice.get().map(|text| {
            view! {
                <div class="notice-banner">
                    <span>{text}</span>
                    <button on:click=move |_| notice.set(None)>"Dismiss"</button>
                </div>
            }
        })
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
