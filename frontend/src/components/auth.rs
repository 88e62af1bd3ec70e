use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use findmeroom::models::RegisterRequest;
use findmeroom::router::View;

use crate::state::AppState;

#[component]
pub fn LoginPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let on_submit = {
        let state = state.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            set_busy.set(true);
            set_error.set(None);
            let state = state.clone();
            spawn_local(async move {
                let ctl = state.session_controller();
                match ctl.login(&email.get_untracked(), &password.get_untracked()).await {
                    Ok(()) => state.signed_in(),
                    Err(e) => set_error.set(Some(e.form_message("Login failed"))),
                }
                set_busy.set(false);
            });
        }
    };

    view! {
        <section class="auth-form">
            <h2>"Login"</h2>
            {move || error.get().map(|e| view! { <div class="error-banner">{e}</div> })}
            <form on:submit=on_submit>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=email
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=password
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button type="submit" class="primary" disabled=busy>
                    {move || if busy.get() { "Logging in..." } else { "Login" }}
                </button>
            </form>
            <p>
                "Don't have an account? "
                <a href="#" on:click=move |ev| {
                    ev.prevent_default();
                    state.navigate(View::Register);
                }>"Register"</a>
            </p>
        </section>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let form = RwSignal::new(RegisterRequest::default());
    let (error, set_error) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let on_submit = {
        let state = state.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            set_busy.set(true);
            set_error.set(None);
            let state = state.clone();
            spawn_local(async move {
                let account = form.get_untracked();
                match state.session_controller().register(&account).await {
                    Ok(()) => state.signed_in(),
                    Err(e) => set_error.set(Some(e.form_message("Registration failed"))),
                }
                set_busy.set(false);
            });
        }
    };

    let field = move |label: &'static str, kind: &'static str, pick: fn(&mut RegisterRequest) -> &mut String, read: fn(&RegisterRequest) -> String| {
        view! {
            <input
                type=kind
                placeholder=label
                prop:value=move || form.with(read)
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| *pick(f) = value);
                }
            />
        }
    };

    view! {
        <section class="auth-form">
            <h2>"Register"</h2>
            {move || error.get().map(|e| view! { <div class="error-banner">{e}</div> })}
            <form on:submit=on_submit>
                {field("Full name", "text", |f| &mut f.name, |f| f.name.clone())}
                {field("Email", "email", |f| &mut f.email, |f| f.email.clone())}
                {field("Phone number", "tel", |f| &mut f.phone, |f| f.phone.clone())}
                {field("Password", "password", |f| &mut f.password, |f| f.password.clone())}
                <button type="submit" class="primary" disabled=busy>
                    {move || if busy.get() { "Creating account..." } else { "Register" }}
                </button>
            </form>
            <p>
                "Already have an account? "
                <a href="#" on:click=move |ev| {
                    ev.prevent_default();
                    state.navigate(View::Login);
                }>"Login"</a>
            </p>
        </section>
    }
}
