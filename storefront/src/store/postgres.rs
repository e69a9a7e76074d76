// storefront/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
  like_pattern, ImportRequestFilter, ImportRequestRepository, OrderFilter, OrderPlacement, OrderRepository,
  ProductFilter, ProductRepository, UserRepository,
};
use crate::errors::Result;
use crate::models::{
  ImportRequest, ImportRequestStatus, NewImportRequest, NewOrder, NewProduct, Order, OrderStatus, Page, PageRequest,
  Product, ProductChanges, Role, User,
};

const PRODUCT_COLUMNS: &str =
  "id, name, description, quantity, price, category, brand, part_number, image, is_active, created_at, updated_at";
const ORDER_COLUMNS: &str =
  "id, product_id, product_name, customer_name, address, phone, quantity, status, created_at, updated_at";
const IMPORT_REQUEST_COLUMNS: &str = "id, customer_name, email, phone, car_make, car_model, car_year, part_name, \
   description, quantity, additional_notes, status, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPool::connect(database_url).await?;
    Ok(Self::new(pool))
  }

  /// Applies embedded migrations.
  pub async fn migrate(&self) -> Result<()> {
    MIGRATOR.run(&self.pool).await?;
    Ok(())
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

fn push_product_predicates(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
  qb.push(" WHERE TRUE");
  if filter.active_only {
    qb.push(" AND is_active = TRUE");
  }
  if let Some(search) = &filter.search {
    let pattern = like_pattern(search);
    qb.push(" AND (name ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR description ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR brand ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR part_number ILIKE ")
      .push_bind(pattern)
      .push(")");
  }
  if let Some(category) = &filter.category {
    qb.push(" AND category ILIKE ").push_bind(like_pattern(category));
  }
}

fn push_order_predicates(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
  qb.push(" WHERE TRUE");
  if let Some(status) = filter.status {
    qb.push(" AND status = ").push_bind(status);
  }
}

fn push_import_request_predicates(qb: &mut QueryBuilder<'_, Postgres>, filter: &ImportRequestFilter) {
  qb.push(" WHERE TRUE");
  if let Some(status) = filter.status {
    qb.push(" AND status = ").push_bind(status);
  }
  if let Some(search) = &filter.search {
    let pattern = like_pattern(search);
    qb.push(" AND (customer_name ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR email ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR car_make ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR car_model ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR part_name ILIKE ")
      .push_bind(pattern)
      .push(")");
  }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
  qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
    .push_bind(page.limit_i64())
    .push(" OFFSET ")
    .push_bind(page.offset());
}

#[async_trait]
impl ProductRepository for PgStore {
  #[instrument(name = "pg::list_products", skip(self))]
  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
    push_product_predicates(&mut qb, filter);
    push_page(&mut qb, page);
    let items = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_product_predicates(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

    Ok(Page { items, total })
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "pg::insert_product", skip(self, product), fields(part_number = %product.part_number))]
  async fn insert_product(&self, product: NewProduct) -> Result<Product> {
    let created = sqlx::query_as::<_, Product>(&format!(
      r#"
      INSERT INTO products (id, name, description, quantity, price, category, brand, part_number, image, is_active)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
      RETURNING {}
      "#,
      PRODUCT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.quantity)
    .bind(product.price)
    .bind(&product.category)
    .bind(&product.brand)
    .bind(&product.part_number)
    .bind(&product.image)
    .fetch_one(&self.pool)
    .await?;
    debug!(product_id = %created.id, "Product row inserted.");
    Ok(created)
  }

  #[instrument(name = "pg::update_product", skip(self, changes))]
  async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Option<Product>> {
    let mut qb = QueryBuilder::new("UPDATE products SET updated_at = NOW()");
    if let Some(v) = &changes.name {
      qb.push(", name = ").push_bind(v.clone());
    }
    if let Some(v) = &changes.description {
      qb.push(", description = ").push_bind(v.clone());
    }
    if let Some(v) = changes.quantity {
      qb.push(", quantity = ").push_bind(v);
    }
    if let Some(v) = changes.price {
      qb.push(", price = ").push_bind(v);
    }
    if let Some(v) = &changes.category {
      qb.push(", category = ").push_bind(v.clone());
    }
    if let Some(v) = &changes.brand {
      qb.push(", brand = ").push_bind(v.clone());
    }
    if let Some(v) = &changes.part_number {
      qb.push(", part_number = ").push_bind(v.clone());
    }
    if let Some(v) = &changes.image {
      qb.push(", image = ").push_bind(v.clone());
    }
    if let Some(v) = changes.is_active {
      qb.push(", is_active = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(format!(" RETURNING {}", PRODUCT_COLUMNS));

    let updated = qb.build_query_as::<Product>().fetch_optional(&self.pool).await?;
    Ok(updated)
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() == 1)
  }

  async fn active_categories(&self) -> Result<Vec<String>> {
    let categories: Vec<String> = sqlx::query_scalar(
      "SELECT DISTINCT category FROM products \
       WHERE is_active = TRUE AND category IS NOT NULL AND category <> '' \
       ORDER BY category ASC",
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(categories)
  }
}

#[async_trait]
impl OrderRepository for PgStore {
  #[instrument(
    name = "pg::place_order",
    skip(self, order),
    fields(product_id = %order.product_id, quantity = order.quantity)
  )]
  async fn place_order(&self, order: NewOrder) -> Result<OrderPlacement> {
    let mut tx = self.pool.begin().await?;

    // Row-level conditional decrement; concurrent writers serialize on the row lock
    // and re-evaluate the predicate, so stock can never go below zero.
    let decremented = sqlx::query(
      "UPDATE products SET quantity = quantity - $1, updated_at = NOW() \
       WHERE id = $2 AND is_active = TRUE AND quantity >= $1",
    )
    .bind(order.quantity)
    .bind(order.product_id)
    .execute(&mut *tx)
    .await?;

    if decremented.rows_affected() != 1 {
      warn!("Conditional stock decrement matched no row; rolling back.");
      tx.rollback().await?;
      return Ok(OrderPlacement::StockUnavailable);
    }

    let placed = sqlx::query_as::<_, Order>(&format!(
      r#"
      INSERT INTO orders (id, product_id, product_name, customer_name, address, phone, quantity, status)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      RETURNING {}
      "#,
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(order.product_id)
    .bind(&order.product_name)
    .bind(&order.customer_name)
    .bind(&order.address)
    .bind(&order.phone)
    .bind(order.quantity)
    .bind(OrderStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(OrderPlacement::Placed(placed))
  }

  #[instrument(name = "pg::list_orders", skip(self))]
  async fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM orders", ORDER_COLUMNS));
    push_order_predicates(&mut qb, filter);
    push_page(&mut qb, page);
    let items = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_order_predicates(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

    Ok(Page { items, total })
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }
}

#[async_trait]
impl ImportRequestRepository for PgStore {
  #[instrument(name = "pg::insert_import_request", skip(self, request))]
  async fn insert_import_request(&self, request: NewImportRequest) -> Result<ImportRequest> {
    let created = sqlx::query_as::<_, ImportRequest>(&format!(
      r#"
      INSERT INTO import_requests
        (id, customer_name, email, phone, car_make, car_model, car_year, part_name,
         description, quantity, additional_notes, status)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
      RETURNING {}
      "#,
      IMPORT_REQUEST_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&request.customer_name)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(&request.car_make)
    .bind(&request.car_model)
    .bind(request.car_year)
    .bind(&request.part_name)
    .bind(&request.description)
    .bind(request.quantity)
    .bind(&request.additional_notes)
    .bind(ImportRequestStatus::Pending)
    .fetch_one(&self.pool)
    .await?;
    Ok(created)
  }

  #[instrument(name = "pg::list_import_requests", skip(self))]
  async fn list_import_requests(
    &self,
    filter: &ImportRequestFilter,
    page: PageRequest,
  ) -> Result<Page<ImportRequest>> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM import_requests", IMPORT_REQUEST_COLUMNS));
    push_import_request_predicates(&mut qb, filter);
    push_page(&mut qb, page);
    let items = qb.build_query_as::<ImportRequest>().fetch_all(&self.pool).await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM import_requests");
    push_import_request_predicates(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

    Ok(Page { items, total })
  }

  async fn find_import_request(&self, id: Uuid) -> Result<Option<ImportRequest>> {
    let request = sqlx::query_as::<_, ImportRequest>(&format!(
      "SELECT {} FROM import_requests WHERE id = $1",
      IMPORT_REQUEST_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(request)
  }

  async fn set_import_request_status(&self, id: Uuid, status: ImportRequestStatus) -> Result<Option<ImportRequest>> {
    let request = sqlx::query_as::<_, ImportRequest>(&format!(
      "UPDATE import_requests SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
      IMPORT_REQUEST_COLUMNS
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(request)
  }
}

#[async_trait]
impl UserRepository for PgStore {
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  #[instrument(name = "pg::upsert_admin", skip(self, password_hash))]
  async fn upsert_admin(&self, email: &str, password_hash: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
      r#"
      INSERT INTO users (id, email, password_hash, role)
      VALUES ($1, $2, $3, $4)
      ON CONFLICT (email) DO UPDATE
      SET password_hash = EXCLUDED.password_hash, role = EXCLUDED.role, updated_at = NOW()
      RETURNING {}
      "#,
      USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(Role::Admin)
    .fetch_one(&self.pool)
    .await?;
    Ok(user)
  }
}
