use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Discount code. Codes are stored canonicalized upper-case and matched
/// case-insensitively by canonicalizing the lookup input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    /// Whole-number percentage, 1-100.
    pub discount_percent: u8,
    pub is_active: bool,
}

impl Coupon {
    /// Builds an active coupon, canonicalizing the code and validating
    /// the percentage range.
    pub fn new(code: &str, discount_percent: u8) -> Result<Self, ServiceError> {
        let code = Self::canonicalize(code);
        if code.is_empty() {
            return Err(ServiceError::validation("code", "must not be empty"));
        }
        if !(1..=100).contains(&discount_percent) {
            return Err(ServiceError::validation(
                "discount_percent",
                "must be between 1 and 100",
            ));
        }
        Ok(Self {
            code,
            discount_percent,
            is_active: true,
        })
    }

    /// Trims whitespace and upper-cases a code for exact matching.
    pub fn canonicalize(code: &str) -> String {
        code.trim().to_uppercase()
    }
}
