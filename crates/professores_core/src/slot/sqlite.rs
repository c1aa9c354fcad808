//! Durable slot backed by the `kv_slots` table.

use super::{KeyValueSlot, SlotError, SlotResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed key-value slot.
///
/// Owns one migrated connection; calls are serialized through a mutex.
pub struct SqliteSlot {
    conn: Mutex<Connection>,
}

impl SqliteSlot {
    /// Opens (or creates) a slot database file.
    pub fn open(path: impl AsRef<Path>) -> SlotResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a slot database that lives only as long as this value.
    pub fn open_in_memory() -> SlotResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already went through `open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> SlotResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SlotError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl KeyValueSlot for SqliteSlot {
    fn get(&self, key: &str) -> SlotResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT slot_value FROM kv_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_slots (slot_key, slot_value)
             VALUES (?1, ?2)
             ON CONFLICT(slot_key) DO UPDATE SET
                slot_value = excluded.slot_value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
