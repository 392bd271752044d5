use serde::Serialize;

use crate::store::StoreError;

/// Crate-wide service error.
///
/// Collaborator failures are converted at the store boundary into
/// [`StoreError`] and surface here via `Persistence`; fire-and-forget
/// paths (order persistence, stock reconciliation) log and absorb them
/// instead of propagating.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Payment proof is required for pay-ahead orders")]
    PaymentProofMissing,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(
        #[from]
        #[serde(skip)]
        StoreError,
    ),
}

impl ServiceError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The offending field for validation errors, for UI highlighting.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field() {
        let err = ServiceError::validation("postal_code", "must not be empty");
        assert_eq!(err.field(), Some("postal_code"));
        assert!(err.to_string().contains("postal_code"));
    }

    #[test]
    fn store_error_converts() {
        let err: ServiceError = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }
}
