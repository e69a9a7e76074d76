// storefront/src/services/order_service.rs

//! "Buy now" order placement and the admin order back office.
//!
//! Placement runs as a short sequence of steps; the first failing step
//! decides the error:
//!   1. `validate_order_input`  - required fields, quantity >= 1
//!   2. `load_orderable_product` - exists and is active
//!   3. `check_stock`            - in stock, enough stock
//!   4. `commit_order`           - atomic conditional decrement + insert
//!
//! Steps 2-3 give precise errors for the common case. Step 4 is what
//! actually guarantees stock never goes negative under concurrency.

use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::auth_service::Identity;
use super::{non_empty, parse_id};
use crate::errors::{AppError, Result};
use crate::models::{NewOrder, Order, OrderStatus, Page, PageRequest, Product};
use crate::store::{OrderFilter, OrderPlacement, Store};

/// Commit attempts when the conditional decrement loses a race but a
/// re-read shows enough stock again.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Raw "buy now" request as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
  pub product_id: Option<String>,
  pub product_name: Option<String>,
  pub customer_name: Option<String>,
  pub address: Option<String>,
  pub phone: Option<String>,
  pub quantity: Option<i64>,
}

struct ValidatedOrder {
  product_id: String,
  product_name: String,
  customer_name: String,
  address: String,
  phone: String,
  quantity: i32,
}

fn product_unavailable() -> AppError {
  AppError::NotFound("The specified product does not exist or is not available".to_string())
}

fn order_not_found() -> AppError {
  AppError::NotFound("Order not found".to_string())
}

fn validate_order_input(input: CreateOrderInput) -> Result<ValidatedOrder> {
  let (product_id, product_name, customer_name, address, phone) = match (
    non_empty(input.product_id),
    non_empty(input.product_name),
    non_empty(input.customer_name),
    non_empty(input.address),
    non_empty(input.phone),
  ) {
    (Some(a), Some(b), Some(c), Some(d), Some(e)) => (a, b, c, d, e),
    _ => {
      return Err(AppError::validation(
        "productId, productName, customerName, address, and phone are required",
      ))
    }
  };

  let quantity = input.quantity.unwrap_or(1);
  let quantity = i32::try_from(quantity)
    .ok()
    .filter(|q| *q >= 1)
    .ok_or_else(|| AppError::validation("Quantity must be at least 1"))?;

  Ok(ValidatedOrder {
    product_id,
    product_name,
    customer_name,
    address,
    phone,
    quantity,
  })
}

async fn load_orderable_product(store: &dyn Store, raw_id: &str) -> Result<Product> {
  let id = parse_id(raw_id).ok_or_else(product_unavailable)?;
  match store.find_product(id).await? {
    Some(product) if product.is_active => Ok(product),
    _ => Err(product_unavailable()),
  }
}

fn check_stock(product: &Product, requested: i32) -> Result<()> {
  if product.quantity <= 0 {
    return Err(AppError::OutOfStock);
  }
  if product.quantity < requested {
    return Err(AppError::InsufficientStock {
      available: product.quantity,
    });
  }
  Ok(())
}

async fn commit_order(store: &dyn Store, order: NewOrder) -> Result<Order> {
  for attempt in 1..=MAX_COMMIT_ATTEMPTS {
    match store.place_order(order.clone()).await? {
      OrderPlacement::Placed(placed) => return Ok(placed),
      OrderPlacement::StockUnavailable => {
        warn!(attempt, "Stock changed before commit; re-checking product.");
        let product = load_orderable_product(store, &order.product_id.to_string()).await?;
        check_stock(&product, order.quantity)?;
      }
    }
  }
  Err(AppError::Internal(format!(
    "Stock for product {} kept changing during order placement",
    order.product_id
  )))
}

/// Places a cash-on-delivery order and decrements stock atomically.
#[instrument(
  name = "order_service::create_order",
  skip(store, input),
  fields(product_id = ?input.product_id, quantity = ?input.quantity)
)]
pub async fn create_order(store: &dyn Store, input: CreateOrderInput) -> Result<Order> {
  let validated = validate_order_input(input)?;
  let product = load_orderable_product(store, &validated.product_id).await?;
  check_stock(&product, validated.quantity)?;

  let order = commit_order(
    store,
    NewOrder {
      product_id: product.id,
      product_name: validated.product_name,
      customer_name: validated.customer_name,
      address: validated.address,
      phone: validated.phone,
      quantity: validated.quantity,
    },
  )
  .await?;

  info!(order_id = %order.id, product_id = %order.product_id, quantity = order.quantity, "Order created.");
  Ok(order)
}

#[instrument(name = "order_service::list_orders", skip(store, admin), fields(admin = %admin.email))]
pub async fn list_orders(
  store: &dyn Store,
  admin: &Identity,
  filter: &OrderFilter,
  page: PageRequest,
) -> Result<Page<Order>> {
  store.list_orders(filter, page).await
}

pub async fn get_order(store: &dyn Store, _admin: &Identity, id: Uuid) -> Result<Order> {
  store.find_order(id).await?.ok_or_else(order_not_found)
}

/// Parses a status as sent by the client.
pub fn parse_order_status(raw: Option<&str>) -> Result<OrderStatus> {
  let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| AppError::validation("Status is required"))?;
  raw
    .parse::<OrderStatus>()
    .map_err(|_| AppError::validation("Status must be one of: PENDING, PROCESSING, COMPLETED, CANCELLED"))
}

/// Any status may follow any other; no transition graph is enforced.
#[instrument(name = "order_service::update_order_status", skip(store, admin), fields(admin = %admin.email))]
pub async fn update_order_status(store: &dyn Store, admin: &Identity, id: Uuid, status: OrderStatus) -> Result<Order> {
  let order = store.set_order_status(id, status).await?.ok_or_else(order_not_found)?;
  info!(order_id = %order.id, status = %order.status, "Order status updated.");
  Ok(order)
}
