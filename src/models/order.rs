use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartLine;

/// Order status lifecycle: Pending until an admin marks the order
/// Shipped or Rejected; both are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Shipped | Self::Rejected)
    }
}

/// How the customer pays. Pay-ahead (UPI/QR) requires an uploaded
/// payment proof before the order can be placed; pay-on-delivery does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    PayAhead,
    PayOnDelivery,
}

/// Whether a locally confirmed order has reached durable storage.
///
/// The factory returns the order before persistence completes, so the UI
/// can show a receipt immediately; this state lets it distinguish that
/// receipt from a durably saved order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceState {
    Pending,
    Persisted,
    Failed,
}

/// One purchased line, deep-copied from the cart at order creation.
/// Later cart or catalog mutation never affects a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    /// Unit price in integer currency units, as priced at purchase time.
    pub price: i64,
    pub quantity: u32,
    pub color: Option<String>,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            price: line.product.price,
            quantity: line.quantity,
            color: line.selected_color.clone(),
        }
    }
}

/// Immutable order record (status aside).
///
/// Invariant: `final_total = total - discount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Timestamp-derived, strictly monotonic within a process; sortable
    /// by creation order.
    pub id: String,
    pub customer_name: String,
    /// Flat formatted delivery address, composed once at creation.
    /// Includes the phone number.
    pub address: String,
    pub items: Vec<OrderItem>,
    /// Subtotal in integer currency units.
    pub total: i64,
    /// Discount amount (currency units, not percent).
    pub discount: i64,
    pub final_total: i64,
    pub payment_method: PaymentMethod,
    /// Opaque handle to the uploaded payment-proof image, if any.
    pub payment_proof: Option<String>,
    /// After-sale lookup token: 2 uppercase letters + 6 digits. Not a
    /// security boundary.
    pub verification_code: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
