use tracing::{error, info, warn};

use crate::api::RentalApi;
use crate::errors::AppError;
use crate::models::{NewProperty, Property, PropertyType};
use crate::state::StateHandle;

/// Listing form as typed: every field is still text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub rent: String,
    pub deposit: String,
    pub location: String,
    pub city: String,
    /// Comma separated.
    pub amenities: String,
    /// Data URLs of attached photos.
    pub images: Vec<String>,
}

impl ListingDraft {
    pub fn to_new_property(&self) -> Result<NewProperty, AppError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
            ("city", &self.city),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::empty_field(field));
            }
        }

        Ok(NewProperty {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            property_type: self.property_type,
            rent: parse_amount("rent", &self.rent)?,
            deposit: parse_amount("deposit", &self.deposit)?,
            location: self.location.trim().to_string(),
            city: self.city.trim().to_string(),
            images: self.images.clone(),
            amenities: split_amenities(&self.amenities),
        })
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<i64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::empty_field(field));
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::InvalidNumber { field_name: field.to_string(), value: raw.to_string() }),
    }
}

pub fn split_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Post listing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PostListingState {
    pub draft: ListingDraft,
    pub submitting: bool,
    pub error: Option<String>,
    /// Most recently created listing; set on success.
    pub created: Option<Property>,
}

// ── My listings ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MyListingsState {
    pub properties: Vec<Property>,
    pub loading: bool,
    /// Listing whose delete is in flight.
    pub deleting: Option<String>,
    pub error: Option<String>,
}

/// Listing writes and the owner's own listings.
#[derive(Clone)]
pub struct ListingsController<A> {
    api: A,
    token: String,
}

impl<A: RentalApi> ListingsController<A> {
    pub fn new(api: A, token: impl Into<String>) -> Self {
        Self { api, token: token.into() }
    }

    /// Submits the draft. On failure the draft is kept and an inline error set.
    pub async fn post<H>(&self, state: &H) -> Result<Property, AppError>
    where
        H: StateHandle<PostListingState>,
    {
        let prepared = state.write(|s| {
            if s.submitting {
                return None;
            }
            match s.draft.to_new_property() {
                Ok(new) => {
                    s.submitting = true;
                    s.error = None;
                    Some(Ok(new))
                }
                Err(e) => {
                    s.error = Some(e.to_string());
                    Some(Err(e))
                }
            }
        });
        let new = match prepared.flatten() {
            Some(result) => result?,
            None => return Err(AppError::InFlight { action: "posting" }),
        };

        let result = self.api.create_property(&self.token, &new).await;
        state.write(|s| {
            s.submitting = false;
            match &result {
                Ok(created) => {
                    info!("Posted listing {}", created.id);
                    s.draft = ListingDraft::default();
                    s.created = Some(created.clone());
                }
                Err(e) => {
                    warn!("Failed to post listing: {e}");
                    s.error = Some(format!("Failed to post property: {e}"));
                }
            }
        });
        result
    }

    pub async fn load_mine<H>(&self, state: &H)
    where
        H: StateHandle<MyListingsState>,
    {
        if state.write(|s| s.loading = true).is_none() {
            return;
        }
        let result = self.api.my_properties(&self.token).await;
        state.write(|s| {
            s.loading = false;
            match result {
                Ok(properties) => s.properties = properties,
                Err(e) => error!("Failed to fetch my properties: {e}"),
            }
        });
    }

    /// Removes one of the owner's listings. The row disappears only once the
    /// server confirms.
    pub async fn delete<H>(&self, state: &H, property_id: &str) -> Result<(), AppError>
    where
        H: StateHandle<MyListingsState>,
    {
        let started = state.write(|s| {
            if s.deleting.is_some() {
                return false;
            }
            s.deleting = Some(property_id.to_string());
            s.error = None;
            true
        });
        match started {
            Some(true) => {}
            Some(false) => return Err(AppError::InFlight { action: "deleting" }),
            None => return Ok(()),
        }

        let result = self.api.delete_property(&self.token, property_id).await;
        state.write(|s| {
            s.deleting = None;
            match &result {
                Ok(()) => s.properties.retain(|p| p.id != property_id),
                Err(e) => {
                    warn!("Failed to delete property {property_id}: {e}");
                    s.error = Some(format!("Failed to delete property: {e}"));
                }
            }
        });
        result
    }
}
