pub mod client_db;
pub mod database;
pub mod identity;

pub use client_db::ClientDatabase;
pub use identity::{SESSION_ID_KEY, SessionStore, resolve_session_id};

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Ensure the directory holding `db_path` exists.
pub fn ensure_data_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Open the visitor's settings store, or `None` when it is unusable.
pub fn open_session_store(db_path: &str) -> Option<ClientDatabase> {
    if let Err(err) = ensure_data_dir(db_path) {
        log::warn!("Cannot create data directory for {db_path}: {err}");
        return None;
    }

    match ClientDatabase::with_path(db_path) {
        Ok(db) => Some(db),
        Err(err) => {
            log::warn!("Cannot open session store {db_path}: {err}");
            None
        }
    }
}
