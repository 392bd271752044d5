use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel variant used when a product declares no color variants.
pub const DEFAULT_COLOR: &str = "Default";

/// Catalog product category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Category {
    Chargers,
    Covers,
    ScreenGuards,
    Audio,
    Cables,
}

/// Customer review attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    /// 1-5 stars.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog product. Owned by the catalog collaborator; the checkout core
/// treats it as read-only input and snapshots it into cart lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    /// Price in integer currency units.
    pub price: i64,
    /// Declared color variants, in display order. May be empty in stored
    /// data; `first_color` falls back to the sentinel.
    #[serde(default)]
    pub colors: Vec<String>,
    pub stock: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub sales_count: u32,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    pub fn new(name: impl Into<String>, category: Category, price: i64, stock: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            price,
            colors: Vec::new(),
            stock,
            rating: 0.0,
            sales_count: 0,
            reviews: Vec::new(),
        }
    }

    pub fn with_colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    /// First declared color variant, or the `"Default"` sentinel.
    pub fn first_color(&self) -> &str {
        self.colors.first().map(String::as_str).unwrap_or(DEFAULT_COLOR)
    }
}
