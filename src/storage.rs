use crate::constants::SETTINGS_KEY;
use web_sys as web;

fn local_storage() -> Option<web::Storage> {
    web::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Stored settings JSON, if storage is available and holds any.
pub fn load_settings() -> Option<String> {
    local_storage().and_then(|s| s.get_item(SETTINGS_KEY).ok().flatten())
}

/// Best effort; private browsing or quota errors are logged and ignored.
pub fn save_settings(json: &str) {
    match local_storage() {
        Some(s) => {
            if let Err(e) = s.set_item(SETTINGS_KEY, json) {
                log::warn!("[settings] could not persist: {:?}", e);
            }
        }
        None => log::debug!("[settings] localStorage unavailable"),
    }
}
