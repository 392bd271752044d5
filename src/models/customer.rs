use serde::{Deserialize, Serialize};

/// Saved customer profile. Survives a checkout reset and is upserted to
/// the store when an order is placed, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}
