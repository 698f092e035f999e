//! Error taxonomy shared by both facades

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::EntityKind;
use crate::core::store::StoreError;

/// Convenience alias used throughout the facades
pub type Result<T, E = TroveError> = std::result::Result<T, E>;

/// Errors returned by facade operations
///
/// Every failed operation leaves the facade's in-memory state exactly as it
/// was before the call.
#[derive(Debug, Error, Diagnostic)]
pub enum TroveError {
    #[error("{kind} '{id}' not found")]
    #[diagnostic(code(trove::not_found), help("list existing records to find the right id"))]
    NotFound { kind: EntityKind, id: String },

    #[error("invalid {field}: {reason}")]
    #[diagnostic(code(trove::invalid_argument))]
    InvalidArgument { field: &'static str, reason: String },

    #[error("{kind} '{id}' already exists")]
    #[diagnostic(code(trove::duplicate), help("ids must be unique within a kind"))]
    Duplicate { kind: EntityKind, id: String },

    #[error("cannot {action}: {reason}")]
    #[diagnostic(code(trove::precondition))]
    Precondition { action: &'static str, reason: String },

    #[error("user '{user_id}' has outstanding fines of {fines:.2}")]
    #[diagnostic(
        code(trove::fines_outstanding),
        help("settle the balance with `trove lib pay` before borrowing")
    )]
    FinesOutstanding { user_id: String, fines: f64 },

    #[error("{kind} '{id}' is not available")]
    #[diagnostic(code(trove::not_available))]
    NotAvailable { kind: EntityKind, id: String },

    #[error("no open loan of '{media_id}' by '{user_id}'")]
    #[diagnostic(
        code(trove::no_active_transaction),
        help("see `trove lib loans <USER>` for the user's open loans")
    )]
    NoActiveTransaction { user_id: String, media_id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

impl TroveError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        TroveError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TroveError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn precondition(action: &'static str, reason: impl Into<String>) -> Self {
        TroveError::Precondition {
            action,
            reason: reason.into(),
        }
    }

    /// True for every refusal caused by the current state rather than bad input
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TroveError::Precondition { .. }
                | TroveError::FinesOutstanding { .. }
                | TroveError::NotAvailable { .. }
                | TroveError::NoActiveTransaction { .. }
                | TroveError::Duplicate { .. }
        )
    }
}

/// Reject negative or non-finite amounts
pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TroveError::invalid(
            field,
            format!("must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

/// Reject blank required text
pub fn ensure_present(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TroveError::invalid(field, "must not be empty"));
    }
    Ok(())
}
