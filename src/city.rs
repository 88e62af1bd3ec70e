use tracing::warn;

use crate::storage::{Storage, CITY_KEY};

/// Major Indian cities offered by the city picker, sorted.
pub const MAJOR_CITIES: &[&str] = &[
    "Agra", "Ahmedabad", "Ajmer", "Akola", "Aligarh", "Allahabad", "Ambattur", "Amravati",
    "Amritsar", "Asansol", "Aurangabad", "Bangalore", "Bareilly", "Belgaum", "Bhavnagar",
    "Bhilai", "Bhiwandi", "Bhopal", "Bhubaneswar", "Bikaner", "Chandigarh", "Chennai",
    "Coimbatore", "Cuttack", "Dehradun", "Delhi", "Dhanbad", "Durgapur", "Erode", "Faridabad",
    "Firozabad", "Gaya", "Ghaziabad", "Gorakhpur", "Gulbarga", "Guntur", "Gurgaon", "Guwahati",
    "Gwalior", "Howrah", "Hubballi-Dharwad", "Hyderabad", "Indore", "Jabalpur", "Jaipur",
    "Jalandhar", "Jalgaon", "Jammu", "Jamnagar", "Jamshedpur", "Jhansi", "Jodhpur",
    "Kalyan-Dombivali", "Kanpur", "Kochi", "Kolhapur", "Kolkata", "Kota", "Loni", "Lucknow",
    "Ludhiana", "Madurai", "Maheshtala", "Malegaon", "Mangalore", "Meerut", "Mumbai", "Mysore",
    "Nagpur", "Nanded", "Nashik", "Navi Mumbai", "Nellore", "Noida", "Patna",
    "Pimpri-Chinchwad", "Pune", "Raipur", "Rajkot", "Ranchi", "Rourkela", "Saharanpur", "Salem",
    "Sangli-Miraj & Kupwad", "Siliguri", "Solapur", "Srinagar", "Surat", "Thane",
    "Tiruchirappalli", "Tirunelveli", "Tiruppur", "Udaipur", "Ujjain", "Ulhasnagar", "Vadodara",
    "Varanasi", "Vasai-Virar", "Vijayawada", "Visakhapatnam", "Warangal",
];

/// Case-insensitive substring match over [`MAJOR_CITIES`].
pub fn search_cities(term: &str) -> Vec<&'static str> {
    let needle = term.trim().to_lowercase();
    MAJOR_CITIES
        .iter()
        .copied()
        .filter(|city| needle.is_empty() || city.to_lowercase().contains(&needle))
        .collect()
}

/// The one locality the user browses, persisted across sessions.
pub struct CityStore {
    selected: Option<String>,
    storage: Box<dyn Storage>,
}

impl CityStore {
    pub fn open(storage: impl Storage + 'static) -> Self {
        let selected = storage.get(CITY_KEY).filter(|c| !c.trim().is_empty());
        Self { selected, storage: Box::new(storage) }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selects `city`; a blank value clears the selection.
    pub fn select(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            self.clear();
            return;
        }
        if let Err(e) = self.storage.set(CITY_KEY, city) {
            warn!("City not persisted: {e}");
        }
        self.selected = Some(city.to_string());
    }

    /// Drops the selection and its persisted value.
    pub fn clear(&mut self) {
        self.storage.remove(CITY_KEY);
        self.selected = None;
    }
}
