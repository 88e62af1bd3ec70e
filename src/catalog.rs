use tracing::{debug, error};

use crate::api::RentalApi;
use crate::models::{Property, PropertyType};
use crate::state::StateHandle;

/// Catalog query. Empty fields are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub city: String,
    pub property_type: Option<PropertyType>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
}

impl PropertyFilter {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self { city: city.into(), ..Self::default() }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let city = self.city.trim();
        if !city.is_empty() {
            pairs.push(("city", city.to_string()));
        }
        if let Some(t) = self.property_type {
            pairs.push(("property_type", t.as_str().to_string()));
        }
        if let Some(min) = self.min_rent {
            pairs.push(("min_rent", min.to_string()));
        }
        if let Some(max) = self.max_rent {
            pairs.push(("max_rent", max.to_string()));
        }
        pairs
    }
}

/// Parses a rent bound typed into a filter box. Blank or unparsable input
/// means "no bound".
pub fn parse_rent_bound(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Ticket for one catalog request; only the latest ticket may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    pub filter: PropertyFilter,
}

/// Listing search results for the home view.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    /// Filter of the last issued request.
    pub filter: PropertyFilter,
    pub properties: Vec<Property>,
    pub loading: bool,
    /// Property open in the detail view.
    pub selected: Option<String>,
    generation: u64,
}

impl CatalogState {
    pub fn begin_search(&mut self, filter: PropertyFilter) -> SearchTicket {
        self.generation += 1;
        self.loading = true;
        self.filter = filter.clone();
        SearchTicket { generation: self.generation, filter }
    }

    /// Commits results if `ticket` is still the latest request. Returns whether
    /// the results were applied.
    pub fn apply_results(&mut self, ticket: &SearchTicket, properties: Vec<Property>) -> bool {
        if ticket.generation != self.generation {
            debug!("Dropping superseded catalog results for {:?}", ticket.filter);
            return false;
        }
        self.properties = properties;
        self.loading = false;
        if let Some(id) = &self.selected {
            if !self.properties.iter().any(|p| &p.id == id) {
                self.selected = None;
            }
        }
        true
    }

    /// Previous results stay on screen.
    pub fn fail_search(&mut self, ticket: &SearchTicket) {
        if ticket.generation == self.generation {
            self.loading = false;
        }
    }

    pub fn open_details(&mut self, property_id: &str) {
        if self.properties.iter().any(|p| p.id == property_id) {
            self.selected = Some(property_id.to_string());
        }
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn selected_property(&self) -> Option<&Property> {
        let id = self.selected.as_deref()?;
        self.properties.iter().find(|p| p.id == id)
    }
}

#[derive(Clone)]
pub struct CatalogController<A, H> {
    api: A,
    state: H,
}

impl<A, H> CatalogController<A, H>
where
    A: RentalApi,
    H: StateHandle<CatalogState>,
{
    pub fn new(api: A, state: H) -> Self {
        Self { api, state }
    }

    pub async fn search(&self, filter: PropertyFilter) {
        let Some(ticket) = self.state.write(|s| s.begin_search(filter)) else {
            return;
        };
        match self.api.list_properties(&ticket.filter).await {
            Ok(properties) => {
                self.state.write(|s| s.apply_results(&ticket, properties));
            }
            Err(e) => {
                error!("Failed to fetch properties: {e}");
                self.state.write(|s| s.fail_search(&ticket));
            }
        }
    }

    /// Search scoped to the chosen city, or everything when none is chosen.
    pub async fn search_city(&self, city: Option<&str>) {
        self.search(PropertyFilter::for_city(city.unwrap_or_default())).await
    }
}
