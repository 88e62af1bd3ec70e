use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::AppError;

/// Key under which the bearer token persists.
pub const TOKEN_KEY: &str = "token";
/// Key under which the chosen city persists.
pub const CITY_KEY: &str = "selectedCity";

/// Durable string key/value storage that outlives a page load.
/// A missing key is a normal state, never an error.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str);
}

/// In-process storage. Clones share the same map, so a clone handed to a
/// fresh store behaves like a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}
