use leptos::prelude::*;

use findmeroom::router::View;

use crate::state::AppState;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let state = expect_context::<AppState>();

    let details = {
        let state = state.clone();
        move || {
            state.user().map(|user| {
                view! {
                    <div class="profile-details">
                        <div class="avatar">{user.name.chars().next().map(|c| c.to_uppercase().to_string())}</div>
                        <h3>{user.name.clone()}</h3>
                        <p class="email">{user.email.clone()}</p>
                    </div>
                }
            })
        }
    };

    let go = |state: AppState, view: View| move |_: leptos::ev::MouseEvent| state.navigate(view);

    view! {
        <section class="profile">
            <h2>"My Profile"</h2>
            {details}
            <div class="profile-actions">
                <button class="primary" on:click=go(state.clone(), View::PostListing)>"Post a Property"</button>
                <button on:click=go(state.clone(), View::MyListings)>"My Properties"</button>
                <button on:click=go(state.clone(), View::Chat)>"Messages"</button>
                <button class="logout-btn" on:click=move |_| state.logout()>"Logout"</button>
            </div>
        </section>
    }
}
