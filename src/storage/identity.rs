//! Stable per-visitor session identity.
//!
//! The visitor keeps one session id across runs so the conversation
//! continues where it left off. When the local store cannot be used the
//! client still gets a usable id, it just won't survive a restart.

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;

/// Storage key of the visitor's session id.
pub const SESSION_ID_KEY: &str = "chat_session_id";

/// Durable string storage scoped to this device.
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Returns the persisted session id, creating and persisting one if needed.
///
/// Never fails: an unreachable store yields a fresh, non-persisted id.
pub fn resolve_session_id(store: Option<&dyn SessionStore>) -> String {
    let Some(store) = store else {
        log::warn!("No session store available; using a temporary session id");
        return fallback_session_id();
    };

    match store.load(SESSION_ID_KEY) {
        Ok(Some(existing)) if !existing.trim().is_empty() => {
            log::debug!("Reusing persisted session id {existing}");
            return existing;
        }
        Ok(_) => {}
        Err(err) => {
            log::warn!("Failed to read persisted session id: {err}");
            return fallback_session_id();
        }
    }

    let id = Uuid::new_v4().to_string();
    if let Err(err) = store.save(SESSION_ID_KEY, &id) {
        log::warn!("Failed to persist session id: {err}");
        return fallback_session_id();
    }

    log::info!("Created new chat session {id}");
    id
}

/// `sess_<unix millis>_<random hex>`, used whenever the id cannot be persisted.
pub fn fallback_session_id() -> String {
    let random = Uuid::new_v4();
    format!(
        "sess_{}_{}",
        Utc::now().timestamp_millis(),
        hex::encode(&random.as_bytes()[..6])
    )
}
