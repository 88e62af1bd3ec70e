use leptos::prelude::*;

use findmeroom::city::search_cities;
use findmeroom::poll::Poller;
use findmeroom::router::View;

use crate::state::{AppState, GlooScheduler};

const NAV: [View; 5] = [View::Home, View::PostListing, View::MyListings, View::Chat, View::Profile];

/// Top bar: navigation, unread badge, city picker and account actions.
#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<AppState>();

    // Badge polling lives as long as the header and only while signed in
    let poller = StoredValue::new_local(Poller::new(GlooScheduler, state.api.config()));
    {
        let state = state.clone();
        Effect::new(move |_| {
            let signed_in = state.is_signed_in();
            poller.update_value(|p| {
                if signed_in {
                    state.refresh_unread();
                    let tick_state = state.clone();
                    p.start_session(move || tick_state.refresh_unread());
                } else {
                    p.stop();
                }
            });
        });
    }

    let router = state.router;
    let unread = state.unread;
    let current = move || router.with(|r| r.current());
    let badge = move || unread.with(|u| u.badge());

    let account = {
        let state = state.clone();
        move || {
            if state.is_signed_in() {
                let name = state.user().map(|u| u.name).unwrap_or_default();
                let state = state.clone();
                view! {
                    <div class="account">
                        <span class="greeting">{format!("Hi, {name}")}</span>
                        <button class="logout-btn" on:click=move |_| state.logout()>"Logout"</button>
                    </div>
                }
                .into_any()
            } else {
                let login = state.clone();
                let register = state.clone();
                view! {
                    <div class="account">
                        <button on:click=move |_| login.navigate(View::Login)>"Login"</button>
                        <button class="primary" on:click=move |_| register.navigate(View::Register)>
                            "Register"
                        </button>
                    </div>
                }
                .into_any()
            }
        }
    };

    view! {
        <header class="header">
            <h1 class="brand" on:click={
                let state = state.clone();
                move |_| state.navigate(View::Home)
            }>"FindMeRoom"</h1>
            <nav class="nav">
                {NAV
                    .into_iter()
                    .map(|item| {
                        let state = state.clone();
                        view! {
                            <button
                                class="nav-item"
                                class:active=move || current() == item
                                on:click=move |_| state.navigate(item)
                            >
                                {item.title()}
                                {(item == View::Chat)
                                    .then(|| move || badge().map(|b| view! { <span class="badge">{b}</span> }))}
                            </button>
                        }
                    })
                    .collect_view()}
            </nav>
            <CitySelector />
            {account}
        </header>
    }
}

/// Free-text city box with suggestions from the built-in list.
#[component]
fn CitySelector() -> impl IntoView {
    let state = expect_context::<AppState>();
    let city = state.city;
    let (term, set_term) = signal(city.with_untracked(|c| c.selected().unwrap_or_default().to_string()));
    let (open, set_open) = signal(false);

    let choose = move |name: String| {
        set_term.set(name.clone());
        set_open.set(false);
        city.update(|c| c.select(&name));
    };

    let suggestions = move || {
        search_cities(&term.get())
            .into_iter()
            .take(8)
            .map(|name| {
                view! {
                    <li on:mousedown=move |_| choose(name.to_string())>{name}</li>
                }
            })
            .collect_view()
    };

    view! {
        <div class="city-selector">
            <input
                type="text"
                placeholder="Select city"
                prop:value=term
                on:input=move |ev| {
                    set_term.set(event_target_value(&ev));
                    set_open.set(true);
                }
                on:focus=move |_| set_open.set(true)
                on:blur=move |_| set_open.set(false)
                on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        ev.prevent_default();
                        choose(term.get_untracked());
                    }
                }
            />
            {move || {
                city.with(|c| c.selected().is_some()).then(|| view! {
                    <button class="clear-city" on:click=move |_| {
                        set_term.set(String::new());
                        city.update(|c| c.clear());
                    }>"×"</button>
                })
            }}
            <Show when=move || open.get()>
                <ul class="city-suggestions">{suggestions}</ul>
            </Show>
        </div>
    }
}
