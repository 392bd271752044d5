//! In-memory cart store.
//!
//! An ordered collection of line items keyed by product id. Purely
//! in-memory; never talks to a collaborator. Totals are not cached here —
//! the pricing engine recomputes them from the lines on every query.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Product;

/// One cart entry: a product snapshot plus quantity and an optional
/// selected color. Composition, not a structurally-extended product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    /// Always >= 1.
    pub quantity: u32,
    pub selected_color: Option<String>,
}

impl CartLine {
    pub fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product: product.clone(),
            quantity: quantity.max(1),
            selected_color: Some(product.first_color().to_string()),
        }
    }

    /// Line subtotal in integer currency units.
    pub fn line_total(&self) -> i64 {
        self.product.price * i64::from(self.quantity)
    }
}

/// Ordered cart contents. Insertion order is preserved; incrementing an
/// existing line never reorders it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, merging into an existing line when one exists.
    ///
    /// Lines are keyed by product id alone, NOT by (product id, color):
    /// adding the same product with two different colors merges into one
    /// line, accumulating quantity and keeping only the most recently set
    /// color. Known quirk, kept as documented behavior.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        match self.line_mut(product.id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine::new(product, quantity)),
        }
    }

    /// Removes the line entirely, regardless of quantity.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    /// Adjusts a line's quantity by `delta`, floored at 1. The floor is
    /// a no-op, not a removal: a delta that would go below 1 leaves the
    /// line at quantity 1.
    pub fn update_quantity(&mut self, product_id: Uuid, delta: i32) {
        if let Some(line) = self.line_mut(product_id) {
            let next = i64::from(line.quantity) + i64::from(delta);
            line.quantity = next.max(1) as u32;
        }
    }

    /// Sets the selected color on an existing line.
    pub fn set_color(&mut self, product_id: Uuid, color: impl Into<String>) {
        if let Some(line) = self.line_mut(product_id) {
            line.selected_color = Some(color.into());
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    fn line_mut(&mut self, product_id: Uuid) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product.id == product_id)
    }
}
