use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::database::Database;
use super::identity::SessionStore;
use crate::error::Result;

/// Local key/value settings for the visitor client (persisted session id).
pub struct ClientDatabase {
    db: Database,
}

impl ClientDatabase {
    /// Open (or create) the settings database at `path`.
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Self::from_database(Database::new(path)?)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::from_database(Database::in_memory()?)
    }

    fn from_database(db: Database) -> SqlResult<Self> {
        let client_db = Self { db };
        client_db.init_schema()?;
        Ok(client_db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.db.connection().execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> SqlResult<Option<String>> {
        let conn = self.db.connection();
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
    }

    /// Insert or replace, keeping the original `created_at`.
    pub fn put_setting(&self, key: &str, value: &str) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, created_at)
             VALUES (?1, ?2, COALESCE((SELECT created_at FROM settings WHERE key = ?1), strftime('%s', 'now')))",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SessionStore for ClientDatabase {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_setting(key)?)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        Ok(self.put_setting(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");

        {
            let db = ClientDatabase::with_path(&path).unwrap();
            assert_eq!(db.get_setting("chat_session_id").unwrap(), None);
            db.put_setting("chat_session_id", "abc").unwrap();
        }

        let reopened = ClientDatabase::with_path(&path).unwrap();
        assert_eq!(
            reopened.get_setting("chat_session_id").unwrap().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn put_replaces_existing_value() {
        let db = ClientDatabase::in_memory().unwrap();
        db.put_setting("k", "one").unwrap();
        db.put_setting("k", "two").unwrap();
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("two"));
    }
}
