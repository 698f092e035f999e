//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod query;
pub mod store;
pub mod workspace;

pub use config::{Config, ConfigError};
pub use entity::Entity;
pub use error::{Result, TroveError};
pub use identity::{EntityKind, IdParseError};
pub use query::SortOrder;
pub use store::{AnyStore, Backend, FileStore, MemoryStore, Record, SqliteStore, Store, StoreError};
pub use workspace::{Workspace, WorkspaceError};
