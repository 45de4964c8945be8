//! Error taxonomy for the role editor.
//!
//! [`EditorError`] is what every editing operation returns. Variants fall into
//! two classes: recoverable states the caller surfaces to the operator
//! (validation messages, a save already in flight, an empty catalog, a
//! failed persistence call) and programmer errors (unknown permission ids,
//! invariant violations) which reject the mutation outright.

use crate::ids::{PermissionId, RoleId};
use validator::ValidationErrors;

/// Error returned by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error type for role editing operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Field-level validation failure (empty, duplicate or oversized values).
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unknown permission: {0}")]
    UnknownPermission(PermissionId),

    #[error("Selection invariant violated: {0}")]
    InvariantViolation(String),

    #[error("A save is already in progress for role {0}")]
    AlreadySaving(RoleId),

    #[error("Permission catalog is unavailable")]
    CatalogUnavailable,

    #[error("Role not found: {0}")]
    RoleNotFound(RoleId),

    #[error("No role is selected")]
    NoActiveRole,

    #[error("No role switch is awaiting confirmation")]
    NoPendingSwitch,

    #[error("A switch to role {0} is already awaiting confirmation")]
    SwitchPending(RoleId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EditorError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Flattens `validator` output into a single field-level error.
    ///
    /// Fields are reported in name order so the message is stable.
    pub fn from_validation_errors(errors: &ValidationErrors) -> Self {
        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        let field = field_errors
            .first()
            .map(|(field, _)| field.to_string())
            .unwrap_or_else(|| "input".to_string());

        let message = field_errors
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self::Validation { field, message }
    }

    /// Whether the caller should surface this error and let the operator continue.
    ///
    /// `false` marks the programmer-error class: the mutation was rejected and
    /// nothing was changed, but retrying the same call will fail again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            EditorError::UnknownPermission(_) | EditorError::InvariantViolation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_validation_display() {
        let err = EditorError::validation("name", "name required");
        assert_eq!(err.to_string(), "name: name required");
    }

    #[test]
    fn test_recoverable_classes() {
        assert!(EditorError::CatalogUnavailable.is_recoverable());
        assert!(EditorError::AlreadySaving(RoleId::new(1)).is_recoverable());
        assert!(EditorError::from(StoreError::Unavailable("down".into())).is_recoverable());
        assert!(!EditorError::UnknownPermission(PermissionId::new(9)).is_recoverable());
        assert!(!EditorError::InvariantViolation("x".into()).is_recoverable());
    }

    #[test]
    fn test_from_validation_errors_uses_messages() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("length");
        error.message = Some("Name must be between 1 and 100 characters".into());
        errors.add("name", error);

        match EditorError::from_validation_errors(&errors) {
            EditorError::Validation { field, message } => {
                assert_eq!(field, "name");
                assert_eq!(message, "Name must be between 1 and 100 characters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_validation_errors_without_message() {
        let mut errors = ValidationErrors::new();
        errors.add("description", ValidationError::new("length"));

        match EditorError::from_validation_errors(&errors) {
            EditorError::Validation { field, message } => {
                assert_eq!(field, "description");
                assert_eq!(message, "description is invalid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
