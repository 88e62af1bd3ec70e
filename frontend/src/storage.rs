use findmeroom::storage::Storage;
use findmeroom::AppError;

/// `window.localStorage`. Reads degrade to "absent" when storage is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorage;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl Storage for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let storage =
            local_storage().ok_or_else(|| AppError::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| AppError::Storage(format!("{e:?}")))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            if let Err(e) = storage.remove_item(key) {
                log::warn!("Could not remove {key} from localStorage: {e:?}");
            }
        }
    }
}
