//! Entity trait - common interface for all record types

use crate::core::identity::EntityKind;

/// Common trait for all records owned by a facade
///
/// Covers the two capabilities every record shares: it can be identified
/// and it can describe itself on one line.
pub trait Entity {
    /// The record kind
    const KIND: EntityKind;

    /// Get the record's unique ID
    fn id(&self) -> &str;

    /// One-line human description used by listings and logs
    fn display_line(&self) -> String;
}

/// Case-insensitive id comparison used by the organization records
pub fn same_id(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Add `id` to `list` unless it is already present
pub fn push_unique(list: &mut Vec<String>, id: &str) -> bool {
    if list.iter().any(|existing| existing == id) {
        return false;
    }
    list.push(id.to_string());
    true
}

/// Remove every occurrence of `id` from `list`
pub fn remove_id(list: &mut Vec<String>, id: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != id);
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique() {
        let mut list = vec!["E001".to_string()];
        assert!(!push_unique(&mut list, "E001"));
        assert!(push_unique(&mut list, "E002"));
        assert_eq!(list, vec!["E001", "E002"]);
    }

    #[test]
    fn test_remove_id() {
        let mut list = vec!["P001".to_string(), "P002".to_string()];
        assert!(remove_id(&mut list, "P001"));
        assert!(!remove_id(&mut list, "P001"));
        assert_eq!(list, vec!["P002"]);
    }

    #[test]
    fn test_same_id_ignores_case() {
        assert!(same_id("t007", "T007"));
        assert!(!same_id("T007", "T008"));
    }
}
