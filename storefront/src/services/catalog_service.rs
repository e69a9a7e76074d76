// storefront/src/services/catalog_service.rs

//! Product listing, lookup and admin maintenance.
//!
//! Asset cleanup always runs after the record change has been written and is
//! best-effort: a storage failure never fails or rolls back the record change.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::asset_storage::{remove_best_effort, AssetStorage, UploadedImage};
use super::auth_service::Identity;
use crate::errors::{AppError, Result};
use crate::models::{NewProduct, Page, PageRequest, Product, ProductChanges};
use crate::store::{ProductFilter, Store};

fn product_not_found() -> AppError {
  AppError::NotFound("Product not found".to_string())
}

/// Quantity as submitted in a form; absent or unparseable becomes 0.
pub fn coerce_quantity(raw: Option<&str>) -> i32 {
  raw.and_then(|v| v.trim().parse::<i32>().ok()).unwrap_or(0)
}

/// Price as submitted in a form; absent or unparseable becomes 0.
pub fn coerce_price(raw: Option<&str>) -> f64 {
  raw
    .and_then(|v| v.trim().parse::<f64>().ok())
    .filter(|p| p.is_finite())
    .unwrap_or(0.0)
}

#[instrument(name = "catalog::list_products", skip(store))]
pub async fn list_products(store: &dyn Store, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>> {
  let products = store.list_products(filter, page).await?;
  info!(returned = products.items.len(), total = products.total, "Products listed.");
  Ok(products)
}

/// Single-product lookup. With `active_only`, inactive products are
/// reported as missing.
#[instrument(name = "catalog::get_product", skip(store))]
pub async fn get_product(store: &dyn Store, id: Uuid, active_only: bool) -> Result<Product> {
  match store.find_product(id).await? {
    Some(product) if product.is_active || !active_only => Ok(product),
    _ => Err(product_not_found()),
  }
}

pub async fn list_categories(store: &dyn Store) -> Result<Vec<String>> {
  store.active_categories().await
}

#[instrument(
  name = "catalog::create_product",
  skip(store, assets, admin, product, image),
  fields(admin = %admin.email, part_number = %product.part_number, with_image = image.is_some())
)]
pub async fn create_product(
  store: &dyn Store,
  assets: &dyn AssetStorage,
  admin: &Identity,
  mut product: NewProduct,
  image: Option<UploadedImage>,
) -> Result<Product> {
  let stored_image = match &image {
    Some(image) => Some(assets.save_image(image).await?),
    None => None,
  };
  product.image = stored_image.clone();

  match store.insert_product(product).await {
    Ok(created) => {
      info!(product_id = %created.id, "Product created.");
      Ok(created)
    }
    Err(e) => {
      if let Some(reference) = stored_image {
        remove_best_effort(assets, &reference).await;
      }
      Err(e)
    }
  }
}

#[instrument(
  name = "catalog::update_product",
  skip(store, assets, admin, changes, image),
  fields(admin = %admin.email, with_image = image.is_some())
)]
pub async fn update_product(
  store: &dyn Store,
  assets: &dyn AssetStorage,
  admin: &Identity,
  id: Uuid,
  mut changes: ProductChanges,
  image: Option<UploadedImage>,
) -> Result<Product> {
  let existing = store.find_product(id).await?.ok_or_else(product_not_found)?;

  let new_image = match &image {
    Some(image) => Some(assets.save_image(image).await?),
    None => None,
  };
  if new_image.is_some() {
    changes.image = new_image.clone();
  }

  let updated = match store.update_product(id, &changes).await {
    Ok(Some(updated)) => updated,
    Ok(None) => {
      // Deleted between the existence check and the write.
      if let Some(reference) = &new_image {
        remove_best_effort(assets, reference).await;
      }
      return Err(product_not_found());
    }
    Err(e) => {
      if let Some(reference) = &new_image {
        remove_best_effort(assets, reference).await;
      }
      return Err(e);
    }
  };

  if new_image.is_some() {
    if let Some(old) = existing.image.as_deref() {
      remove_best_effort(assets, old).await;
    }
  }

  info!(product_id = %updated.id, "Product updated.");
  Ok(updated)
}

/// Hard delete. Historical orders keep their dangling `product_id`.
#[instrument(name = "catalog::delete_product", skip(store, assets, admin), fields(admin = %admin.email))]
pub async fn delete_product(store: &dyn Store, assets: &dyn AssetStorage, admin: &Identity, id: Uuid) -> Result<()> {
  let existing = store.find_product(id).await?.ok_or_else(product_not_found)?;

  if !store.delete_product(id).await? {
    warn!(product_id = %id, "Product vanished before delete.");
    return Err(product_not_found());
  }

  if let Some(reference) = existing.image.as_deref() {
    remove_best_effort(assets, reference).await;
  }
  info!(product_id = %id, "Product deleted.");
  Ok(())
}
