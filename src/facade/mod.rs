//! Domain facades
//!
//! A facade owns every collection of one domain, keeps the cross-record
//! invariants true across mutations and mirrors touched collections to a
//! [`Store`](crate::core::store::Store).
//!
//! Mutations follow a staged commit: clone the state, apply the change and
//! its cascades to the clone, persist the touched kinds, then swap the clone
//! in. A failed validation or write leaves the facade untouched.

pub mod library;
pub mod organization;
pub mod seed;

pub use seed::{seed_library, seed_organization, SeedCounts};
pub use library::{Library, LibraryStatistics, NewBook, NewDvd, NewMagazine, NewUser, OverdueLoan};
pub use organization::{
    NewDepartment, NewEmployee, NewEquipment, NewProject, OrgStatistics, Organization,
};

use serde::Serialize;

use crate::core::entity::Entity;
use crate::core::error::{Result, TroveError};
use crate::core::identity::{next_id, validate_id, EntityKind};
use crate::core::query::{exact_search, position_of};

/// How ids are compared within a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdMatch {
    Exact,
    IgnoreCase,
}

impl IdMatch {
    /// The form of an id that equal ids share under this matcher
    fn key(self, id: &str) -> String {
        match self {
            IdMatch::Exact => id.to_string(),
            IdMatch::IgnoreCase => id.to_ascii_uppercase(),
        }
    }
}

/// Index of the record with `id`
pub(crate) fn index_of<T: Entity>(items: &[T], id: &str, matcher: IdMatch) -> Option<usize> {
    match matcher {
        IdMatch::Exact => position_of(items, |item: &T| item.id(), id),
        IdMatch::IgnoreCase => {
            let keys: Vec<String> = items.iter().map(|item| matcher.key(item.id())).collect();
            position_of(&keys, |key: &String| key.as_str(), matcher.key(id).as_str())
        }
    }
}

/// Like [`index_of`], but a miss is a `NotFound` error
pub(crate) fn locate<T: Entity>(items: &[T], id: &str, matcher: IdMatch) -> Result<usize> {
    index_of(items, id, matcher).ok_or_else(|| TroveError::not_found(T::KIND, id))
}

/// Look up a record by id through the query engine's exact search
pub(crate) fn find<'a, T: Entity>(items: &'a [T], id: &str, matcher: IdMatch) -> Result<&'a T> {
    let found = match matcher {
        IdMatch::Exact => exact_search(items, |item: &T| item.id(), id),
        IdMatch::IgnoreCase => {
            let keyed: Vec<(String, &T)> = items
                .iter()
                .map(|item| (matcher.key(item.id()), item))
                .collect();
            exact_search(&keyed, |(key, _)| key.as_str(), matcher.key(id).as_str())
                .map(|(_, item)| *item)
        }
    };
    found.ok_or_else(|| TroveError::not_found(T::KIND, id))
}

/// Next generated id for `prefix`, compared the way `matcher` compares ids
pub(crate) fn generate_id<T: Entity>(items: &[T], prefix: &str, matcher: IdMatch) -> Result<String> {
    next_id(prefix, items.iter().map(|item| matcher.key(item.id())))
        .map_err(|e| TroveError::precondition("generate id", e.to_string()))
}

/// Validate a caller-supplied id and make sure it is not taken yet
pub(crate) fn ensure_new_id<T: Entity>(items: &[T], id: &str, matcher: IdMatch) -> Result<()> {
    validate_id(id).map_err(|e| TroveError::invalid("id", e.to_string()))?;
    if index_of(items, id, matcher).is_some() {
        return Err(TroveError::Duplicate {
            kind: T::KIND,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// A drift between denormalized data and the records it summarizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    pub kind: EntityKind,
    pub id: String,
    pub problem: String,
}

impl Inconsistency {
    pub(crate) fn new(kind: EntityKind, id: &str, problem: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.to_string(),
            problem: problem.into(),
        }
    }
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Department;

    fn departments() -> Vec<Department> {
        vec![
            Department::new("D001", "Marine", "North", 1.0),
            Department::new("d007", "Forest", "South", 1.0),
        ]
    }

    #[test]
    fn test_find_respects_matcher() {
        let depts = departments();
        assert_eq!(find(&depts, "D007", IdMatch::IgnoreCase).unwrap().name, "Forest");
        assert_eq!(index_of(&depts, "d001", IdMatch::IgnoreCase), Some(0));
        assert!(matches!(
            find(&depts, "D007", IdMatch::Exact),
            Err(TroveError::NotFound { .. })
        ));
        assert_eq!(index_of(&depts, "d007", IdMatch::Exact), Some(1));
    }

    #[test]
    fn test_generate_id_normalizes_case_when_ignoring_it() {
        let depts = departments();
        assert_eq!(generate_id(&depts, "D", IdMatch::IgnoreCase).unwrap(), "D008");
        assert_eq!(generate_id(&depts, "D", IdMatch::Exact).unwrap(), "D002");
    }
}
