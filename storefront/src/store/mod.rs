// storefront/src/store/mod.rs

//! Repository traits over the relational store and their two backends.
//!
//! Services only ever talk to `dyn Store`. `PgStore` is the production
//! backend; `MemoryStore` keeps everything behind one lock and backs the
//! test-suite and `memory://` runs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
  ImportRequest, ImportRequestStatus, NewImportRequest, NewOrder, NewProduct, Order, OrderStatus, Page, PageRequest,
  Product, ProductChanges, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Recognised catalog filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
  /// Substring over name, description, brand and part number.
  pub search: Option<String>,
  /// Substring over category.
  pub category: Option<String>,
  pub active_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
  pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRequestFilter {
  pub status: Option<ImportRequestStatus>,
  /// Substring over customer name, email, car make/model and part name.
  pub search: Option<String>,
}

/// Outcome of the atomic stock-decrement-and-insert.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPlacement {
  Placed(Order),
  /// The conditional decrement matched no row: the product is gone,
  /// inactive, or holds less than the requested quantity.
  StockUnavailable,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>>;
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;
  async fn insert_product(&self, product: NewProduct) -> Result<Product>;
  async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Option<Product>>;
  /// Returns false when no row existed.
  async fn delete_product(&self, id: Uuid) -> Result<bool>;
  /// Sorted, distinct, non-empty categories of active products.
  async fn active_categories(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
  /// Decrements stock and inserts the order as one atomic unit.
  async fn place_order(&self, order: NewOrder) -> Result<OrderPlacement>;
  async fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>>;
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;
  async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>>;
}

#[async_trait]
pub trait ImportRequestRepository: Send + Sync {
  async fn insert_import_request(&self, request: NewImportRequest) -> Result<ImportRequest>;
  async fn list_import_requests(&self, filter: &ImportRequestFilter, page: PageRequest)
    -> Result<Page<ImportRequest>>;
  async fn find_import_request(&self, id: Uuid) -> Result<Option<ImportRequest>>;
  async fn set_import_request_status(&self, id: Uuid, status: ImportRequestStatus) -> Result<Option<ImportRequest>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  /// Creates or re-keys the ADMIN account for `email`.
  async fn upsert_admin(&self, email: &str, password_hash: &str) -> Result<User>;
}

pub trait Store: ProductRepository + OrderRepository + ImportRequestRepository + UserRepository {}

impl<T> Store for T where T: ProductRepository + OrderRepository + ImportRequestRepository + UserRepository {}

/// Escapes LIKE metacharacters and wraps the text for a substring match.
pub(crate) fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for ch in text.chars() {
    if matches!(ch, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(ch);
  }
  pattern.push('%');
  pattern
}
