//! In-memory backend for tests

use std::collections::HashMap;

use super::{decode_lines, Record, Store, StoreError};
use crate::core::identity::EntityKind;

/// Keeps encoded lines per kind in memory
///
/// Goes through the same encode/decode path as the on-disk backends. Writes
/// can be switched off to exercise failure handling in the facades.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<EntityKind, Vec<String>>,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save_all` fail with [`StoreError::Refused`]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Encoded lines currently held for `kind`
    pub fn lines(&self, kind: EntityKind) -> &[String] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        Ok(decode_lines(
            R::KIND,
            self.lines(R::KIND).iter().map(String::as_str),
        ))
    }

    fn save_all<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Refused);
        }
        self.collections
            .insert(R::KIND, records.iter().map(Record::encode).collect());
        self.saves += 1;
        Ok(())
    }
}
