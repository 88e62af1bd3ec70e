use leptos::prelude::*;
use leptos::task::spawn_local;

use findmeroom::catalog::{parse_rent_bound, CatalogState, PropertyFilter};
use findmeroom::guard::{is_owner, ContactIntent};
use findmeroom::models::{image_src, Property, PropertyType};

use crate::state::AppState;

/// Home view: filters, listing cards and the detail overlay.
#[component]
pub fn CatalogPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let catalog = RwSignal::new(CatalogState::default());
    let ctl = state.catalog_controller(catalog);

    let (kind, set_kind) = signal(String::new());
    let (min_rent, set_min_rent) = signal(String::new());
    let (max_rent, set_max_rent) = signal(String::new());

    let city = state.city;
    let current_filter = move || PropertyFilter {
        city: city.with_untracked(|c| c.selected().unwrap_or_default().to_string()),
        property_type: PropertyType::parse(&kind.get_untracked()),
        min_rent: parse_rent_bound(&min_rent.get_untracked()),
        max_rent: parse_rent_bound(&max_rent.get_untracked()),
    };

    let search = {
        let ctl = ctl.clone();
        move || {
            let ctl = ctl.clone();
            let filter = current_filter();
            spawn_local(async move { ctl.search(filter).await });
        }
    };

    // Re-query whenever the chosen city changes, including on mount
    {
        let search = search.clone();
        Effect::new(move |_| {
            city.track();
            search();
        });
    }

    let on_submit = {
        let search = search.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            search();
        }
    };

    let heading = move || match city.with(|c| c.selected().map(String::from)) {
        Some(name) => format!("Properties in {name}"),
        None => "All Properties".to_string(),
    };

    view! {
        <section class="catalog">
            <h2>{heading}</h2>
            <form class="filters" on:submit=on_submit>
                <select on:change=move |ev| set_kind.set(event_target_value(&ev)) prop:value=kind>
                    <option value="">"All types"</option>
                    {PropertyType::SEARCHABLE
                        .into_iter()
                        .map(|t| view! { <option value=t.as_str()>{t.label()}</option> })
                        .collect_view()}
                </select>
                <input
                    type="number"
                    placeholder="Min rent"
                    prop:value=min_rent
                    on:input=move |ev| set_min_rent.set(event_target_value(&ev))
                />
                <input
                    type="number"
                    placeholder="Max rent"
                    prop:value=max_rent
                    on:input=move |ev| set_max_rent.set(event_target_value(&ev))
                />
                <button type="submit">"Search"</button>
            </form>

            {move || {
                let (loading, empty) = catalog.with(|c| (c.loading, c.properties.is_empty()));
                if loading && empty {
                    view! { <div class="loading">"Loading properties..."</div> }.into_any()
                } else if empty {
                    view! { <div class="empty-state">"No properties found"</div> }.into_any()
                } else {
                    view! {
                        <div class="property-grid">
                            <For
                                each=move || catalog.with(|c| c.properties.clone())
                                key=|p| p.id.clone()
                                let:property
                            >
                                <PropertyCard property=property catalog=catalog />
                            </For>
                        </div>
                    }
                    .into_any()
                }
            }}

            {move || {
                catalog
                    .with(|c| c.selected_property().cloned())
                    .map(|property| view! { <PropertyDetails property=property catalog=catalog /> })
            }}
        </section>
    }
}

/// Badge for the viewer's own listing.
#[component]
fn OwnerTag(property: Property) -> impl IntoView {
    let state = expect_context::<AppState>();
    move || {
        is_owner(state.user().as_ref(), &property)
            .then(|| view! { <span class="owner-tag">"Your Property"</span> })
    }
}

fn amenity_chips(property: &Property) -> impl IntoView + use<> {
    let (shown, hidden) = property.amenity_preview();
    let chips = shown
        .iter()
        .map(|a| view! { <span class="amenity">{a.clone()}</span> })
        .collect_view();
    let more = (hidden > 0).then(|| view! { <span class="amenity more">{format!("+{hidden} more")}</span> });
    view! { <div class="amenities">{chips}{more}</div> }
}

#[component]
fn PropertyCard(property: Property, catalog: RwSignal<CatalogState>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let owned = {
        let state = state.clone();
        let property = property.clone();
        move || is_owner(state.user().as_ref(), &property)
    };
    let contact = {
        let property = property.clone();
        move |_: leptos::ev::MouseEvent| state.contact(&property, ContactIntent::Message)
    };
    let id = property.id.clone();

    view! {
        <div class="property-card">
            <div class="cover">
                {property.cover_image().map(|src| view! { <img src=src alt=property.title.clone() /> })}
                <span class="availability" class:unavailable=!property.available>
                    {if property.available { "Available" } else { "Not Available" }}
                </span>
                <OwnerTag property=property.clone() />
            </div>
            <div class="body">
                <h3>{property.title.clone()}</h3>
                <p class="location">{format!("{}, {}", property.location, property.city)}</p>
                <p class="description">{property.description.clone()}</p>
                <div class="prices">
                    <span class="rent">{format!("₹{}/month", property.rent)}</span>
                    <span class="deposit">{format!("Deposit: ₹{}", property.deposit)}</span>
                </div>
                {amenity_chips(&property)}
                <div class="actions">
                    <button on:click=move |_| catalog.update(|c| c.open_details(&id))>"View Details"</button>
                    {move || {
                        if owned() {
                            view! { <button disabled=true>"Your Property"</button> }.into_any()
                        } else {
                            let contact = contact.clone();
                            view! { <button class="primary" on:click=contact>"Contact Owner"</button> }.into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}

#[component]
fn PropertyDetails(property: Property, catalog: RwSignal<CatalogState>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let owned = {
        let state = state.clone();
        let property = property.clone();
        move || is_owner(state.user().as_ref(), &property)
    };
    let act = {
        let property = property.clone();
        move |intent: ContactIntent| {
            catalog.update(|c| c.close_details());
            state.contact(&property, intent);
        }
    };

    let images = property
        .images
        .iter()
        .map(|img| view! { <img src=image_src(img) alt=property.title.clone() /> })
        .collect_view();
    let amenities = property
        .amenities
        .iter()
        .map(|a| view! { <span class="amenity">{a.clone()}</span> })
        .collect_view();

    view! {
        <div class="modal-backdrop" on:click=move |_| catalog.update(|c| c.close_details())>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <button class="close" on:click=move |_| catalog.update(|c| c.close_details())>"×"</button>
                <h2>{property.title.clone()}</h2>
                <div class="gallery">{images}</div>
                <p class="location">{format!("{}, {}", property.location, property.city)}</p>
                <p class="type">{property.property_type.label()}</p>
                <p>{property.description.clone()}</p>
                <div class="prices">
                    <span class="rent">{format!("₹{}/month", property.rent)}</span>
                    <span class="deposit">{format!("Deposit: ₹{}", property.deposit)}</span>
                </div>
                <div class="amenities">{amenities}</div>
                <div class="actions">
                    {move || {
                        if owned() {
                            view! {
                                <button disabled=true>"Your Property - Cannot Contact"</button>
                                <button disabled=true>"Your Property - Cannot Schedule Visit"</button>
                            }
                            .into_any()
                        } else {
                            let message = act.clone();
                            let visit = act.clone();
                            view! {
                                <button class="primary" on:click=move |_| message(ContactIntent::Message)>
                                    "Contact Owner"
                                </button>
                                <button on:click=move |_| visit(ContactIntent::ScheduleVisit)>
                                    "Schedule Visit"
                                </button>
                            }
                            .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}
