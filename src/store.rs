use crate::app_dirs::AppDirs;
use crate::error::Result;
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Minimal persistent integer store
pub trait ScoreStore {
    fn get_int(&self, key: &str, default: i64) -> Result<i64>;
    fn set_int(&mut self, key: &str, value: i64) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        (**self).get_int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        (**self).set_int(key, value)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Read a score, treating failures and negative values as 0.
pub fn load_score(store: &dyn ScoreStore, key: &str) -> u64 {
    match store.get_int(key, 0) {
        Ok(value) => u64::try_from(value).unwrap_or(0),
        Err(e) => {
            warn!(key, error = %e, "could not read score, using 0");
            0
        }
    }
}

/// Write and flush a score. Failures are logged and otherwise ignored.
pub fn save_score(store: &mut dyn ScoreStore, key: &str, value: u64) -> bool {
    let value = i64::try_from(value).unwrap_or(i64::MAX);
    let result = store.set_int(key, value).and_then(|_| store.flush());
    if let Err(e) = &result {
        warn!(key, value, error = %e, "could not persist score");
    }
    result.is_ok()
}

/// SQLite-backed store
#[derive(Debug)]
pub struct SqliteScoreStore {
    conn: Connection,
}

impl SqliteScoreStore {
    /// Open the store at the default state location
    pub fn new() -> Result<Self> {
        let db_path =
            AppDirs::scores_db_path().unwrap_or_else(|| PathBuf::from("wordclick_scores.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    /// When `key` was last written, as RFC 3339
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM scores WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl ScoreStore for SqliteScoreStore {
    fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM scores WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or(default))
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO scores (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // every statement autocommits; only the page cache needs writing out
        self.conn.cache_flush()?;
        Ok(())
    }
}

/// Process-local store for tests and `--no-persist`
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    values: HashMap<String, i64>,
    pub flushes: usize,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: i64) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value);
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.values.get(key).copied().unwrap_or(default))
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use tempfile::tempdir;

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn get_int(&self, _key: &str, _default: i64) -> Result<i64> {
            Err(GameError::Io(std::io::Error::other("disk gone")))
        }

        fn set_int(&mut self, _key: &str, _value: i64) -> Result<()> {
            Err(GameError::Io(std::io::Error::other("disk gone")))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sqlite_missing_key_returns_default() {
        let store = SqliteScoreStore::in_memory().unwrap();
        assert_eq!(store.get_int("HighScore", 0).unwrap(), 0);
        assert_eq!(store.get_int("HighScore", 42).unwrap(), 42);
    }

    #[test]
    fn sqlite_set_overwrites() {
        let mut store = SqliteScoreStore::in_memory().unwrap();
        store.set_int("HighScore", 300).unwrap();
        store.set_int("HighScore", 900).unwrap();
        store.flush().unwrap();

        assert_eq!(store.get_int("HighScore", 0).unwrap(), 900);
        assert!(store.updated_at("HighScore").unwrap().is_some());
        assert!(store.updated_at("Other").unwrap().is_none());
    }

    #[test]
    fn sqlite_persists_across_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.db");

        {
            let mut store = SqliteScoreStore::open(&path).unwrap();
            store.set_int("HighScore", 1200).unwrap();
            store.flush().unwrap();
        }

        let store = SqliteScoreStore::open(&path).unwrap();
        assert_eq!(store.get_int("HighScore", 0).unwrap(), 1200);
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryScoreStore::with_value("HighScore", 5);
        assert_eq!(store.get_int("HighScore", 0).unwrap(), 5);

        assert!(save_score(&mut store, "HighScore", 75));
        assert_eq!(load_score(&store, "HighScore"), 75);
        assert_eq!(store.flushes, 1);
    }

    #[test]
    fn failing_store_degrades_to_zero() {
        let mut store = BrokenStore;
        assert_eq!(load_score(&store, "HighScore"), 0);
        assert!(!save_score(&mut store, "HighScore", 10));
    }

    #[test]
    fn negative_stored_value_reads_as_zero() {
        let store = MemoryScoreStore::with_value("HighScore", -3);
        assert_eq!(load_score(&store, "HighScore"), 0);
    }
}
