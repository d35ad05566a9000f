//! SQLite-backed persisted state.
//!
//! A single key-value table holds the per-profile notification state:
//! - Snooze/dedup timestamps and the notifications-enabled flag
//! - Install and migration flags
//! - First-run timestamp
//! - The last wallet snapshot seen, used to spot new transactions

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use super::data_dir;
use crate::error::Result;
use crate::notifications::{NotificationDedupState, NotificationKind};
use crate::wallet::{MigrationFlags, WalletSnapshot};

const NOTIFICATION_STATE_KEY: &str = "notification_state";
const MIGRATION_FLAGS_KEY: &str = "migration_flags";
const FIRST_RUN_KEY: &str = "first_run_ms";
const LAST_WALLET_KEY: &str = "last_wallet";
const OUTSTANDING_KEY: &str = "outstanding_notification";
/// How long a writer waits for another process holding the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database for persisted profile state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/payledger/payledger.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("payledger.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Run `f` inside an immediate transaction.
    ///
    /// Other connections' writers wait on the lock (up to the busy timeout)
    /// until `f` returns. Rolls back when `f` fails.
    pub fn with_write_lock<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Read a JSON value. Unreadable JSON is logged and treated as absent.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv_get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable stored value");
                Ok(None)
            }
        }
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.kv_set(key, &json)?;
        Ok(())
    }

    pub fn notification_state(&self) -> Result<NotificationDedupState> {
        Ok(self.load_json(NOTIFICATION_STATE_KEY)?.unwrap_or_default())
    }

    pub fn save_notification_state(&self, state: &NotificationDedupState) -> Result<()> {
        self.save_json(NOTIFICATION_STATE_KEY, state)
    }

    /// Stored migration flags. A profile with no record is a new install.
    pub fn migration_flags(&self) -> Result<MigrationFlags> {
        Ok(self
            .load_json(MIGRATION_FLAGS_KEY)?
            .unwrap_or(MigrationFlags {
                is_new_install: true,
                ..Default::default()
            }))
    }

    pub fn save_migration_flags(&self, flags: &MigrationFlags) -> Result<()> {
        self.save_json(MIGRATION_FLAGS_KEY, flags)
    }

    /// First-run timestamp, recording `now_ms` if none is stored yet.
    pub fn first_run_ms(&self, now_ms: i64) -> Result<i64> {
        if let Some(stored) = self.load_json::<i64>(FIRST_RUN_KEY)? {
            return Ok(stored);
        }
        self.save_json(FIRST_RUN_KEY, &now_ms)?;
        Ok(now_ms)
    }

    pub fn last_wallet(&self) -> Result<Option<WalletSnapshot>> {
        self.load_json(LAST_WALLET_KEY)
    }

    pub fn save_last_wallet(&self, wallet: &WalletSnapshot) -> Result<()> {
        self.save_json(LAST_WALLET_KEY, wallet)
    }

    /// Kind of the notification left on screen by the previous session.
    pub fn outstanding_notification(&self) -> Result<Option<NotificationKind>> {
        Ok(self.load_json::<Option<NotificationKind>>(OUTSTANDING_KEY)?.flatten())
    }

    pub fn save_outstanding_notification(&self, kind: Option<NotificationKind>) -> Result<()> {
        self.save_json(OUTSTANDING_KEY, &kind)
    }
}
