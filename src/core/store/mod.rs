//! Persistence port and its backends
//!
//! The facades only ever ask for "every record of a kind" and hand back
//! "the full collection of a kind". Backends decide how that maps onto
//! disk:
//! - [`FileStore`]: one `<collection>.txt` per kind in a data directory
//! - [`SqliteStore`]: a single `records` table in an embedded database
//! - [`MemoryStore`]: encoded lines kept in memory, for tests

pub mod codec;
mod file;
mod memory;
mod sqlite;

pub use codec::{CodecError, Record, RecordReader, RecordWriter};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use clap::ValueEnum;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::core::identity::EntityKind;

/// Load/save interface every backend implements
pub trait Store {
    /// Every persisted record of `R`'s kind; empty when nothing was saved yet
    fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError>;

    /// Replace the persisted collection of `R`'s kind with `records`
    fn save_all<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError>;
}

/// Errors raised by the persistence backends
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to access {path}")]
    #[diagnostic(code(trove::store::io), help("check that the data directory is writable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error")]
    #[diagnostic(code(trove::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("write refused by the store")]
    #[diagnostic(code(trove::store::refused))]
    Refused,
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Available persistence backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pipe-delimited text files, one per kind
    #[default]
    File,
    /// Embedded SQLite database
    Sqlite,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::File => write!(f, "file"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// A store chosen at runtime
pub enum AnyStore {
    File(FileStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    /// Open the configured backend rooted at `data_dir`
    pub fn open(backend: Backend, data_dir: &Path) -> Result<Self, StoreError> {
        match backend {
            Backend::File => Ok(AnyStore::File(FileStore::open(data_dir)?)),
            Backend::Sqlite => Ok(AnyStore::Sqlite(SqliteStore::open(
                &data_dir.join(SqliteStore::FILE_NAME),
            )?)),
        }
    }
}

impl Store for AnyStore {
    fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        match self {
            AnyStore::File(store) => store.load_all(),
            AnyStore::Sqlite(store) => store.load_all(),
        }
    }

    fn save_all<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        match self {
            AnyStore::File(store) => store.save_all(records),
            AnyStore::Sqlite(store) => store.save_all(records),
        }
    }
}

/// Decode stored lines, skipping the ones that fail to parse
fn decode_lines<'a, R, I>(kind: EntityKind, lines: I) -> Vec<R>
where
    R: Record,
    I: IntoIterator<Item = &'a str>,
{
    let mut records = Vec::new();
    for (number, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match R::decode(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(kind = %kind, line = number + 1, error = %e, "skipping malformed record"),
        }
    }
    records
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::entity::Entity;

    /// Minimal record used by the backend tests
    #[derive(Debug, Clone, PartialEq)]
    pub struct Note {
        pub id: String,
        pub body: String,
    }

    impl Note {
        pub fn new(id: &str, body: &str) -> Self {
            Self {
                id: id.to_string(),
                body: body.to_string(),
            }
        }
    }

    impl Entity for Note {
        const KIND: EntityKind = EntityKind::Department;

        fn id(&self) -> &str {
            &self.id
        }

        fn display_line(&self) -> String {
            format!("{} {}", self.id, self.body)
        }
    }

    impl Record for Note {
        fn encode(&self) -> String {
            RecordWriter::new().text(&self.id).text(&self.body).finish()
        }

        fn decode(line: &str) -> Result<Self, CodecError> {
            let mut r = RecordReader::new(line)?;
            let note = Note {
                id: r.text()?,
                body: r.text()?,
            };
            r.finish()?;
            Ok(note)
        }
    }

    /// Second kind, to check that collections stay apart
    #[derive(Debug, Clone, PartialEq)]
    pub struct Label(pub String);

    impl Entity for Label {
        const KIND: EntityKind = EntityKind::Media;

        fn id(&self) -> &str {
            &self.0
        }

        fn display_line(&self) -> String {
            self.0.clone()
        }
    }

    impl Record for Label {
        fn encode(&self) -> String {
            RecordWriter::new().text(&self.0).finish()
        }

        fn decode(line: &str) -> Result<Self, CodecError> {
            let mut r = RecordReader::new(line)?;
            let label = Label(r.text()?);
            r.finish()?;
            Ok(label)
        }
    }
}
