// storefront/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{
  ImportRequestFilter, ImportRequestRepository, OrderFilter, OrderPlacement, OrderRepository, ProductFilter,
  ProductRepository, UserRepository,
};
use crate::errors::Result;
use crate::models::{
  ImportRequest, ImportRequestStatus, NewImportRequest, NewOrder, NewProduct, Order, OrderStatus, Page, PageRequest,
  Product, ProductChanges, Role, User,
};

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  import_requests: HashMap<Uuid, ImportRequest>,
  users: HashMap<Uuid, User>,
  last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
  /// Strictly increasing so newest-first ordering is total.
  fn next_timestamp(&mut self) -> DateTime<Utc> {
    let mut now = Utc::now();
    if let Some(last) = self.last_timestamp {
      if now <= last {
        now = last + ChronoDuration::microseconds(1);
      }
    }
    self.last_timestamp = Some(now);
    now
  }
}

/// Process-local store. Every operation runs under one lock, which makes
/// order placement trivially atomic.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
  haystack.to_lowercase().contains(needle_lower)
}

fn paginate<T: Clone>(mut rows: Vec<T>, page: PageRequest, created_at: impl Fn(&T) -> DateTime<Utc>) -> Page<T> {
  rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
  let total = rows.len() as i64;
  let items = rows
    .into_iter()
    .skip(page.offset() as usize)
    .take(page.limit as usize)
    .collect();
  Page { items, total }
}

fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
  if filter.active_only && !product.is_active {
    return false;
  }
  if let Some(search) = &filter.search {
    let needle = search.to_lowercase();
    let hit = contains_ci(&product.name, &needle)
      || product.description.as_deref().is_some_and(|d| contains_ci(d, &needle))
      || product.brand.as_deref().is_some_and(|b| contains_ci(b, &needle))
      || contains_ci(&product.part_number, &needle);
    if !hit {
      return false;
    }
  }
  if let Some(category) = &filter.category {
    let needle = category.to_lowercase();
    if !product.category.as_deref().is_some_and(|c| contains_ci(c, &needle)) {
      return false;
    }
  }
  true
}

fn import_request_matches(request: &ImportRequest, filter: &ImportRequestFilter) -> bool {
  if filter.status.is_some_and(|status| request.status != status) {
    return false;
  }
  if let Some(search) = &filter.search {
    let needle = search.to_lowercase();
    return [
      &request.customer_name,
      &request.email,
      &request.car_make,
      &request.car_model,
      &request.part_name,
    ]
    .into_iter()
    .any(|field| contains_ci(field, &needle));
  }
  true
}

#[async_trait]
impl ProductRepository for MemoryStore {
  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>> {
    let tables = self.tables.read();
    let rows: Vec<Product> = tables
      .products
      .values()
      .filter(|p| product_matches(p, filter))
      .cloned()
      .collect();
    Ok(paginate(rows, page, |p| p.created_at))
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn insert_product(&self, product: NewProduct) -> Result<Product> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    let created = Product {
      id: Uuid::new_v4(),
      name: product.name,
      description: product.description,
      quantity: product.quantity,
      price: product.price,
      category: product.category,
      brand: product.brand,
      part_number: product.part_number,
      image: product.image,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    tables.products.insert(created.id, created.clone());
    Ok(created)
  }

  async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    Ok(tables.products.get_mut(&id).map(|product| {
      changes.apply_to(product);
      product.updated_at = now;
      product.clone()
    }))
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    Ok(self.tables.write().products.remove(&id).is_some())
  }

  async fn active_categories(&self) -> Result<Vec<String>> {
    let tables = self.tables.read();
    let mut categories: Vec<String> = tables
      .products
      .values()
      .filter(|p| p.is_active)
      .filter_map(|p| p.category.clone())
      .filter(|c| !c.is_empty())
      .collect();
    categories.sort();
    categories.dedup();
    Ok(categories)
  }
}

#[async_trait]
impl OrderRepository for MemoryStore {
  async fn place_order(&self, order: NewOrder) -> Result<OrderPlacement> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();

    match tables.products.get_mut(&order.product_id) {
      Some(product) if product.is_active && product.quantity >= order.quantity => {
        product.quantity -= order.quantity;
        product.updated_at = now;
      }
      _ => return Ok(OrderPlacement::StockUnavailable),
    }

    let placed = Order {
      id: Uuid::new_v4(),
      product_id: order.product_id,
      product_name: order.product_name,
      customer_name: order.customer_name,
      address: order.address,
      phone: order.phone,
      quantity: order.quantity,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    tables.orders.insert(placed.id, placed.clone());
    Ok(OrderPlacement::Placed(placed))
  }

  async fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
    let tables = self.tables.read();
    let rows: Vec<Order> = tables
      .orders
      .values()
      .filter(|o| filter.status.map_or(true, |status| o.status == status))
      .cloned()
      .collect();
    Ok(paginate(rows, page, |o| o.created_at))
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.get(&id).cloned())
  }

  async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    Ok(tables.orders.get_mut(&id).map(|order| {
      order.status = status;
      order.updated_at = now;
      order.clone()
    }))
  }
}

#[async_trait]
impl ImportRequestRepository for MemoryStore {
  async fn insert_import_request(&self, request: NewImportRequest) -> Result<ImportRequest> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    let created = ImportRequest {
      id: Uuid::new_v4(),
      customer_name: request.customer_name,
      email: request.email,
      phone: request.phone,
      car_make: request.car_make,
      car_model: request.car_model,
      car_year: request.car_year,
      part_name: request.part_name,
      description: request.description,
      quantity: request.quantity,
      additional_notes: request.additional_notes,
      status: ImportRequestStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    tables.import_requests.insert(created.id, created.clone());
    Ok(created)
  }

  async fn list_import_requests(
    &self,
    filter: &ImportRequestFilter,
    page: PageRequest,
  ) -> Result<Page<ImportRequest>> {
    let tables = self.tables.read();
    let rows: Vec<ImportRequest> = tables
      .import_requests
      .values()
      .filter(|r| import_request_matches(r, filter))
      .cloned()
      .collect();
    Ok(paginate(rows, page, |r| r.created_at))
  }

  async fn find_import_request(&self, id: Uuid) -> Result<Option<ImportRequest>> {
    Ok(self.tables.read().import_requests.get(&id).cloned())
  }

  async fn set_import_request_status(&self, id: Uuid, status: ImportRequestStatus) -> Result<Option<ImportRequest>> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    Ok(tables.import_requests.get_mut(&id).map(|request| {
      request.status = status;
      request.updated_at = now;
      request.clone()
    }))
  }
}

#[async_trait]
impl UserRepository for MemoryStore {
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }

  async fn upsert_admin(&self, email: &str, password_hash: &str) -> Result<User> {
    let mut tables = self.tables.write();
    let now = tables.next_timestamp();
    if let Some(existing) = tables.users.values_mut().find(|u| u.email == email) {
      existing.password_hash = password_hash.to_string();
      existing.role = Role::Admin;
      existing.updated_at = now;
      return Ok(existing.clone());
    }
    let user = User {
      id: Uuid::new_v4(),
      email: email.to_string(),
      password_hash: password_hash.to_string(),
      role: Role::Admin,
      created_at: now,
      updated_at: now,
    };
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }
}
