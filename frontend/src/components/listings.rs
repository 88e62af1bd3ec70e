use gloo_timers::callback::Timeout;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{FileReader, HtmlInputElement};

use findmeroom::listings::{ListingDraft, MyListingsState, PostListingState};
use findmeroom::models::{image_src, PropertyType};
use findmeroom::router::View;

use crate::state::{AppState, SignalHandle};

/// Reads every chosen file as a data URL and appends it to the draft.
fn read_images(input: &HtmlInputElement, post: RwSignal<PostListingState>) {
    let Some(files) = input.files() else {
        return;
    };
    for i in 0..files.length() {
        let Some(file) = files.get(i) else { continue };
        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                log::error!("FileReader unavailable: {e:?}");
                return;
            }
        };
        let done = reader.clone();
        let onload = Closure::once_into_js(move || {
            if let Some(url) = done.result().ok().and_then(|r| r.as_string()) {
                post.update(|s| s.draft.images.push(url));
            }
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        if let Err(e) = reader.read_as_data_url(&file) {
            log::warn!("Could not read {}: {e:?}", file.name());
        }
    }
}

#[component]
pub fn PostListingPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let post = RwSignal::new(PostListingState::default());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(ctl) = state.listings_controller() else {
            state.navigate(View::Login);
            return;
        };
        let state = state.clone();
        spawn_local(async move {
            if ctl.post(&SignalHandle::new(post)).await.is_ok() {
                Timeout::new(2_000, move || state.navigate(View::Home)).forget();
            }
        });
    };

    let text = move |label: &'static str, pick: fn(&mut ListingDraft) -> &mut String, read: fn(&ListingDraft) -> String| {
        view! {
            <input
                type="text"
                placeholder=label
                prop:value=move || post.with(|s| read(&s.draft))
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    post.update(|s| *pick(&mut s.draft) = value);
                }
            />
        }
    };

    view! {
        <section class="post-listing">
            <h2>"Post Your Property"</h2>
            {move || {
                post.with(|s| s.created.is_some()).then(|| view! {
                    <div class="success-banner">"Property posted successfully! Redirecting..."</div>
                })
            }}
            {move || post.with(|s| s.error.clone()).map(|e| view! { <div class="error-banner">{e}</div> })}
            <form on:submit=on_submit>
                {text("Property title", |d| &mut d.title, |d| d.title.clone())}
                <textarea
                    placeholder="Description"
                    prop:value=move || post.with(|s| s.draft.description.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        post.update(|s| s.draft.description = value);
                    }
                />
                <select
                    prop:value=move || post.with(|s| s.draft.property_type.as_str())
                    on:change=move |ev| {
                        let kind = PropertyType::parse(&event_target_value(&ev)).unwrap_or_default();
                        post.update(|s| s.draft.property_type = kind);
                    }
                >
                    {PropertyType::SEARCHABLE
                        .into_iter()
                        .map(|t| view! { <option value=t.as_str()>{t.label()}</option> })
                        .collect_view()}
                </select>
                {text("Monthly rent (₹)", |d| &mut d.rent, |d| d.rent.clone())}
                {text("Security deposit (₹)", |d| &mut d.deposit, |d| d.deposit.clone())}
                {text("Location / area", |d| &mut d.location, |d| d.location.clone())}
                {text("City", |d| &mut d.city, |d| d.city.clone())}
                {text("Amenities (comma separated)", |d| &mut d.amenities, |d| d.amenities.clone())}
                <input
                    type="file"
                    accept="image/*"
                    multiple=true
                    on:change=move |ev| {
                        let input: HtmlInputElement = event_target(&ev);
                        read_images(&input, post);
                    }
                />
                <div class="image-previews">
                    {move || {
                        post.with(|s| s.draft.images.clone())
                            .into_iter()
                            .enumerate()
                            .map(|(i, img)| view! {
                                <div class="preview">
                                    <img src=image_src(&img) />
                                    <button type="button" on:click=move |_| post.update(|s| {
                                        if i < s.draft.images.len() {
                                            s.draft.images.remove(i);
                                        }
                                    })>"×"</button>
                                </div>
                            })
                            .collect_view()
                    }}
                </div>
                <button type="submit" class="primary" disabled=move || post.with(|s| s.submitting)>
                    {move || if post.with(|s| s.submitting) { "Posting..." } else { "Post Property" }}
                </button>
            </form>
        </section>
    }
}

#[component]
pub fn MyListingsPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let mine = RwSignal::new(MyListingsState::default());
    let Some(ctl) = state.listings_controller() else {
        return view! { <div class="empty-state">"Please log in to see your properties"</div> }.into_any();
    };

    {
        let ctl = ctl.clone();
        spawn_local(async move { ctl.load_mine(&SignalHandle::new(mine)).await });
    }

    let delete = move |id: String| {
        let ctl = ctl.clone();
        spawn_local(async move {
            // failure is shown inline by the controller
            let _ = ctl.delete(&SignalHandle::new(mine), &id).await;
        });
    };

    view! {
        <section class="my-listings">
            <h2>"My Properties"</h2>
            {move || mine.with(|s| s.error.clone()).map(|e| view! { <div class="error-banner">{e}</div> })}
            {move || {
                let (loading, empty) = mine.with(|s| (s.loading, s.properties.is_empty()));
                if loading && empty {
                    view! { <div class="loading">"Loading your properties..."</div> }.into_any()
                } else if empty {
                    let state = state.clone();
                    view! {
                        <div class="empty-state">
                            <p>"You haven't posted any properties yet."</p>
                            <button class="primary" on:click=move |_| state.navigate(View::PostListing)>
                                "Post Your First Property"
                            </button>
                        </div>
                    }
                    .into_any()
                } else {
                    let delete = delete.clone();
                    view! {
                        <div class="property-grid">
                            <For
                                each=move || mine.with(|s| s.properties.clone())
                                key=|p| p.id.clone()
                                let:property
                            >
                                {
                                    let delete = delete.clone();
                                    let id = property.id.clone();
                                    let deleting_id = id.clone();
                                    let deleting = move || mine.with(|s| s.deleting.as_deref() == Some(deleting_id.as_str()));
                                    view! {
                                        <div class="property-card">
                                            {property.cover_image().map(|src| view! { <img src=src /> })}
                                            <div class="body">
                                                <h3>{property.title.clone()}</h3>
                                                <p class="location">{format!("{}, {}", property.location, property.city)}</p>
                                                <span class="rent">{format!("₹{}/month", property.rent)}</span>
                                                <button
                                                    class="danger"
                                                    disabled=deleting.clone()
                                                    on:click=move |_| delete(id.clone())
                                                >
                                                    {move || if deleting() { "Deleting..." } else { "Delete" }}
                                                </button>
                                            </div>
                                        </div>
                                    }
                                }
                            </For>
                        </div>
                    }
                    .into_any()
                }
            }}
        </section>
    }
    .into_any()
}
