//! Entity kinds and sequential identifiers
//!
//! Every record carries a human-readable id of the form `<prefix><sequence>`
//! such as `M007`. New ids are derived from the live collection: the next id
//! is one past the highest numeric suffix already in use for that prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Zero-padded width of the numeric part of generated ids
pub const ID_WIDTH: usize = 3;

/// The kinds of records kept by the facades
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Organization staff member
    Employee,
    /// Organizational unit
    Department,
    /// Research project led by a scientist
    Project,
    /// Piece of equipment handled by technicians
    Equipment,
    /// Library member or librarian
    User,
    /// Book, magazine or DVD
    Media,
    /// Loan of a media item to a member
    Transaction,
}

impl EntityKind {
    /// Get the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Department => "department",
            EntityKind::Project => "project",
            EntityKind::Equipment => "equipment",
            EntityKind::User => "user",
            EntityKind::Media => "media",
            EntityKind::Transaction => "transaction",
        }
    }

    /// Name of the backing collection (file stem / table partition)
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::Department => "departments",
            EntityKind::Project => "projects",
            EntityKind::Equipment => "equipment",
            EntityKind::User => "users",
            EntityKind::Media => "media",
            EntityKind::Transaction => "transactions",
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Employee,
            EntityKind::Department,
            EntityKind::Project,
            EntityKind::Equipment,
            EntityKind::User,
            EntityKind::Media,
            EntityKind::Transaction,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" | "employees" | "emp" => Ok(EntityKind::Employee),
            "department" | "departments" | "dept" => Ok(EntityKind::Department),
            "project" | "projects" => Ok(EntityKind::Project),
            "equipment" | "equip" => Ok(EntityKind::Equipment),
            "user" | "users" => Ok(EntityKind::User),
            "media" => Ok(EntityKind::Media),
            "transaction" | "transactions" | "loan" => Ok(EntityKind::Transaction),
            _ => Err(IdParseError::InvalidKind(s.to_string())),
        }
    }
}

/// Split an id into its prefix-relative sequence number.
///
/// Returns `None` when the id does not start with `prefix` or the remainder
/// is not a plain decimal number.
pub fn parse_sequence(id: &str, prefix: &str) -> Option<u32> {
    let rest = id.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Format an id from a prefix and sequence number
pub fn format_id(prefix: &str, sequence: u32) -> String {
    format!("{}{:0width$}", prefix, sequence, width = ID_WIDTH)
}

/// Produce the next id for `prefix`, strictly greater than every existing id
/// sharing that prefix.
///
/// Ids with a malformed suffix are ignored. Numbers wider than [`ID_WIDTH`]
/// are printed in full. Fails once the sequence for `prefix` is used up.
///
/// # Examples
/// ```
/// use trove::core::identity::next_id;
///
/// let existing = ["S001", "S002", "S010", "M004"];
/// assert_eq!(next_id("S", existing).unwrap(), "S011");
/// assert_eq!(next_id("T", existing).unwrap(), "T001");
/// ```
pub fn next_id<I, S>(prefix: &str, existing: I) -> Result<String, IdParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| parse_sequence(id.as_ref(), prefix))
        .max()
        .unwrap_or(0);
    let sequence = max
        .checked_add(1)
        .ok_or_else(|| IdParseError::Exhausted(prefix.to_string()))?;
    Ok(format_id(prefix, sequence))
}

/// Errors that can occur when parsing identifiers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("unknown record kind: {0}")]
    InvalidKind(String),

    #[error("id must not be empty")]
    Empty,

    #[error("id '{0}' must not contain whitespace or separators")]
    InvalidCharacters(String),

    #[error("no sequence numbers left for prefix '{0}'")]
    Exhausted(String),
}

/// Check that a caller-supplied id can be stored and referenced
pub fn validate_id(id: &str) -> Result<(), IdParseError> {
    if id.trim().is_empty() {
        return Err(IdParseError::Empty);
    }
    if id.chars().any(|c| c.is_whitespace() || c == '|' || c == ',') {
        return Err(IdParseError::InvalidCharacters(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_skips_gaps() {
        let ids = vec!["S001".to_string(), "S002".to_string(), "S010".to_string()];
        assert_eq!(next_id("S", &ids).unwrap(), "S011");
    }

    #[test]
    fn test_next_id_empty_collection() {
        let ids: Vec<String> = Vec::new();
        assert_eq!(next_id("U", &ids).unwrap(), "U001");
    }

    #[test]
    fn test_next_id_ignores_malformed_and_foreign_ids() {
        let ids = ["M003", "Mx9", "M", "T900", "M00a", "S050"];
        assert_eq!(next_id("M", ids).unwrap(), "M004");
    }

    #[test]
    fn test_next_id_grows_past_width() {
        let ids = ["T999"];
        assert_eq!(next_id("T", ids).unwrap(), "T1000");
    }

    #[test]
    fn test_next_id_refuses_to_wrap_at_the_last_sequence() {
        let last = format!("S{}", u32::MAX);
        assert_eq!(
            next_id("S", [last.as_str()]),
            Err(IdParseError::Exhausted("S".to_string()))
        );
        let below = format!("S{}", u32::MAX - 1);
        assert_eq!(next_id("S", [below.as_str()]).unwrap(), last);
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("E010", "E"), Some(10));
        assert_eq!(parse_sequence("E010", "M"), None);
        assert_eq!(parse_sequence("E-10", "E"), None);
        assert_eq!(parse_sequence("E", "E"), None);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in EntityKind::all() {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("D001").is_ok());
        assert_eq!(validate_id("  "), Err(IdParseError::Empty));
        assert!(matches!(
            validate_id("D 01"),
            Err(IdParseError::InvalidCharacters(_))
        ));
        assert!(validate_id("D|1").is_err());
    }
}
