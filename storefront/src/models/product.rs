// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub quantity: i32,
  pub price: f64,
  pub category: Option<String>,
  pub brand: Option<String>,
  pub part_number: String,
  /// `/uploads/<file>` reference into the asset directory.
  pub image: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Values for a product insert, already coerced and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub quantity: i32,
  pub price: f64,
  pub category: Option<String>,
  pub brand: Option<String>,
  pub part_number: String,
  pub image: Option<String>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub quantity: Option<i32>,
  pub price: Option<f64>,
  pub category: Option<String>,
  pub brand: Option<String>,
  pub part_number: Option<String>,
  pub image: Option<String>,
  pub is_active: Option<bool>,
}

impl ProductChanges {
  /// Applies the changes in place; used by the in-memory store.
  pub fn apply_to(&self, product: &mut Product) {
    if let Some(v) = &self.name {
      product.name = v.clone();
    }
    if let Some(v) = &self.description {
      product.description = Some(v.clone());
    }
    if let Some(v) = self.quantity {
      product.quantity = v;
    }
    if let Some(v) = self.price {
      product.price = v;
    }
    if let Some(v) = &self.category {
      product.category = Some(v.clone());
    }
    if let Some(v) = &self.brand {
      product.brand = Some(v.clone());
    }
    if let Some(v) = &self.part_number {
      product.part_number = v.clone();
    }
    if let Some(v) = &self.image {
      product.image = Some(v.clone());
    }
    if let Some(v) = self.is_active {
      product.is_active = v;
    }
  }
}
