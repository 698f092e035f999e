//! Embedded SQLite backend
//!
//! All kinds share one `records` table keyed by `(kind, id)`. Each record is
//! stored as its encoded line, so both backends agree on the format and a
//! data directory can be moved between them by re-saving.

use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{decode_lines, Record, Store, StoreError};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Database file name inside a data directory
    pub const FILE_NAME: &'static str = "trove.db";

    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                line TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            );
            CREATE INDEX IF NOT EXISTS idx_records_kind_position ON records(kind, position);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Number of stored records of `R`'s kind
    pub fn count<R: Record>(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1",
            params![R::KIND.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl Store for SqliteStore {
    fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT line FROM records WHERE kind = ?1 ORDER BY position")?;
        let lines = stmt
            .query_map(params![R::KIND.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let records = decode_lines(R::KIND, lines.iter().map(String::as_str));
        debug!(kind = %R::KIND, count = records.len(), "loaded records from sqlite");
        Ok(records)
    }

    fn save_all<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        let kind = R::KIND.as_str();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records WHERE kind = ?1", params![kind])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO records (kind, id, position, line) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, record) in records.iter().enumerate() {
                insert.execute(params![kind, record.id(), position as i64, record.encode()])?;
            }
        }
        tx.commit()?;

        debug!(kind = %R::KIND, count = records.len(), "saved records to sqlite");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::test_support::{Label, Note};
    use tempfile::tempdir;

    #[test]
    fn test_empty_database() {
        let store = SqliteStore::open_in_memory().unwrap();
        let notes: Vec<Note> = store.load_all().unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_kinds_are_kept_apart() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .save_all(&[Note::new("D002", "b"), Note::new("D001", "a")])
            .unwrap();
        store.save_all(&[Label("M001".into())]).unwrap();

        let notes: Vec<Note> = store.load_all().unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["D002", "D001"]);
        assert_eq!(store.count::<Label>().unwrap(), 1);
    }

    #[test]
    fn test_save_replaces_kind() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save_all(&[Note::new("D001", "a")]).unwrap();
        store.save_all(&[Note::new("D009", "z")]).unwrap();
        let notes: Vec<Note> = store.load_all().unwrap();
        assert_eq!(notes, vec![Note::new("D009", "z")]);
    }

    #[test]
    fn test_duplicate_ids_roll_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save_all(&[Note::new("D001", "kept")]).unwrap();

        let result = store.save_all(&[Note::new("D002", "x"), Note::new("D002", "y")]);
        assert!(result.is_err());

        let notes: Vec<Note> = store.load_all().unwrap();
        assert_eq!(notes, vec![Note::new("D001", "kept")]);
    }

    #[test]
    fn test_reopen_file_database() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("data").join(SqliteStore::FILE_NAME);
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save_all(&[Note::new("D001", "pipe|and,comma")]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let notes: Vec<Note> = store.load_all().unwrap();
        assert_eq!(notes, vec![Note::new("D001", "pipe|and,comma")]);
    }
}
