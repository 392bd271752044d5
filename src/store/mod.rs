//! Persistence collaborator boundary.
//!
//! The checkout core never talks to a concrete backend directly; every
//! service holds an injected [`PersistenceStore`] trait object. All writes
//! are idempotent-by-replacement (full new value, not a delta) except
//! order creation, which is create-once.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Coupon, CustomerProfile, Order, OrderStatus, Product, Review};

mod memory;

pub use memory::MemoryStore;

/// Error from the remote data store boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Request/response data store for products, orders, coupons and users.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    // Products
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn create_product(&self, product: Product) -> Result<(), StoreError>;
    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError>;
    /// Absolute-value stock write (last-write-wins, no version check).
    async fn update_product_stock(&self, id: Uuid, new_stock: u32) -> Result<(), StoreError>;
    async fn record_sale(&self, id: Uuid, quantity: u32) -> Result<(), StoreError>;
    async fn add_review(&self, id: Uuid, review: Review) -> Result<(), StoreError>;

    // Orders
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError>;
    /// Create-once; a duplicate id is a `Conflict`.
    async fn create_order(&self, order: Order) -> Result<(), StoreError>;
    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError>;

    // Coupons
    async fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError>;
    async fn create_coupon(&self, coupon: Coupon) -> Result<(), StoreError>;
    async fn delete_coupon(&self, code: &str) -> Result<(), StoreError>;

    // Customers
    async fn list_customers(&self) -> Result<Vec<CustomerProfile>, StoreError>;
    async fn upsert_customer(&self, profile: CustomerProfile) -> Result<(), StoreError>;
}
