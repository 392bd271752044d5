use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Coupon, CustomerProfile, Order, OrderStatus, Product, Review};

use super::{PersistenceStore, StoreError};

/// In-memory [`PersistenceStore`] backed by DashMaps.
///
/// Used by tests and demos. The `fail_*` switches make a write category
/// return `StoreError::Unavailable`, which is how tests exercise the
/// silent-failure behavior of the fire-and-forget paths without a
/// network mocking framework.
#[derive(Default)]
pub struct MemoryStore {
    products: DashMap<Uuid, Product>,
    orders: DashMap<String, Order>,
    coupons: DashMap<String, Coupon>,
    customers: DashMap<String, CustomerProfile>,
    fail_order_writes: AtomicBool,
    fail_stock_writes: AtomicBool,
    fail_status_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_order_writes(&self, fail: bool) {
        self.fail_order_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stock_writes(&self, fail: bool) {
        self.fail_stock_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!(
                "{} writes are failing (injected)",
                what
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).map(|e| e.value().clone()))
    }

    async fn create_product(&self, product: Product) -> Result<(), StoreError> {
        self.products.insert(product.id, product);
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))
    }

    async fn update_product_stock(&self, id: Uuid, new_stock: u32) -> Result<(), StoreError> {
        self.check(&self.fail_stock_writes, "stock")?;
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.stock = new_stock;
        Ok(())
    }

    async fn record_sale(&self, id: Uuid, quantity: u32) -> Result<(), StoreError> {
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.sales_count += quantity;
        Ok(())
    }

    async fn add_review(&self, id: Uuid, review: Review) -> Result<(), StoreError> {
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.reviews.push(review);
        let sum: u32 = product.reviews.iter().map(|r| u32::from(r.rating)).sum();
        product.rating = sum as f32 / product.reviews.len() as f32;
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(id).map(|e| e.value().clone()))
    }

    async fn create_order(&self, order: Order) -> Result<(), StoreError> {
        self.check(&self.fail_order_writes, "order")?;
        if self.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        self.check(&self.fail_status_writes, "status")?;
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))?;
        order.status = status;
        Ok(order.value().clone())
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        Ok(self.coupons.iter().map(|e| e.value().clone()).collect())
    }

    async fn create_coupon(&self, coupon: Coupon) -> Result<(), StoreError> {
        self.coupons.insert(coupon.code.clone(), coupon);
        Ok(())
    }

    async fn delete_coupon(&self, code: &str) -> Result<(), StoreError> {
        self.coupons
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("coupon {}", code)))
    }

    async fn list_customers(&self) -> Result<Vec<CustomerProfile>, StoreError> {
        Ok(self.customers.iter().map(|e| e.value().clone()).collect())
    }

    async fn upsert_customer(&self, profile: CustomerProfile) -> Result<(), StoreError> {
        self.customers.insert(profile.email.clone(), profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn order_create_is_create_once() {
        let store = MemoryStore::new();
        let order = Order {
            id: "1".into(),
            customer_name: "A".into(),
            address: "x".into(),
            items: Vec::new(),
            total: 0,
            discount: 0,
            final_total: 0,
            payment_method: crate::models::PaymentMethod::PayOnDelivery,
            payment_proof: None,
            verification_code: "MA000000".into(),
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        store.create_order(order.clone()).await.unwrap();
        assert_matches!(
            store.create_order(order).await,
            Err(StoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn review_updates_average_rating() {
        let store = MemoryStore::new();
        let product = Product::new("Case", Category::Covers, 499, 3);
        store.create_product(product.clone()).await.unwrap();

        for rating in [4, 5] {
            store
                .add_review(
                    product.id,
                    Review {
                        author: "R".into(),
                        rating,
                        comment: "ok".into(),
                        created_at: chrono::Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let updated = store.get_product(product.id).await.unwrap().unwrap();
        assert!((updated.rating - 4.5).abs() < f32::EPSILON);
    }
}
