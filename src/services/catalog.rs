use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Category, Product, Review},
    store::PersistenceStore,
};

/// Input for creating a catalog product.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: Category,
    pub price: i64,
    #[serde(default)]
    pub colors: Vec<String>,
    pub stock: u32,
}

/// Admin-side catalog CRUD. The checkout core only reads products; these
/// writes belong to the back-office collaborator surface.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(store: Arc<dyn PersistenceStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.list_products().await?)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("name", "must not be empty"));
        }
        if input.price <= 0 {
            return Err(ServiceError::validation("price", "must be positive"));
        }

        let product = Product::new(input.name.trim(), input.category, input.price, input.stock)
            .with_colors(input.colors);
        self.store.create_product(product.clone()).await?;
        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;
        info!("Created product {} ({})", product.name, product.id);
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_product(id).await?;
        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;
        Ok(())
    }

    /// Absolute stock write from the admin screen. Shares the stock
    /// field with post-order reconciliation with no version check;
    /// last write wins.
    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: Uuid, new_stock: u32) -> Result<(), ServiceError> {
        let product = self.get_product(id).await?;
        self.store.update_product_stock(id, new_stock).await?;
        self.event_sender
            .send_or_log(Event::StockAdjusted {
                product_id: id,
                old_stock: product.stock,
                new_stock,
            })
            .await;
        Ok(())
    }

    pub async fn add_review(
        &self,
        id: Uuid,
        author: impl Into<String>,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<(), ServiceError> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::validation("rating", "must be 1-5"));
        }
        let review = Review {
            author: author.into(),
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        };
        Ok(self.store.add_review(id, review).await?)
    }
}
