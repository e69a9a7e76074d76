// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::order_service::{self, CreateOrderInput};
use crate::services::parse_id;
use crate::state::AppState;
use crate::validation::{validate_order_query, ListQuery};
use crate::web::extractors::AdminUser;

/// Body of a status change, shared with the import-request back office.
#[derive(Deserialize, Debug, Default)]
pub struct StatusPayload {
  pub status: Option<String>,
}

fn order_not_found() -> AppError {
  AppError::NotFound("Order not found".to_string())
}

#[instrument(name = "handler::create_order", skip(app_state, req_payload))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderInput>,
) -> Result<HttpResponse, AppError> {
  let order = order_service::create_order(app_state.store.as_ref(), req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Order created successfully",
      "order": order,
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state, admin), fields(admin = %admin.email))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
  let (filter, page) = validate_order_query(&query)?;
  let orders = order_service::list_orders(app_state.store.as_ref(), &admin, &filter, page).await?;
  let pagination = orders.pagination(page);
  Ok(HttpResponse::Ok().json(json!({
      "orders": orders.items,
      "pagination": pagination,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, admin, path), fields(order_id = %path.as_str()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path).ok_or_else(order_not_found)?;
  let order = order_service::get_order(app_state.store.as_ref(), &admin, id).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, admin, path, req_payload),
  fields(admin = %admin.email, order_id = %path.as_str(), status = ?req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
  req_payload: web::Json<StatusPayload>,
) -> Result<HttpResponse, AppError> {
  // Status is validated before the order is looked up.
  let status = order_service::parse_order_status(req_payload.status.as_deref())?;
  let id = parse_id(&path).ok_or_else(order_not_found)?;
  let order = order_service::update_order_status(app_state.store.as_ref(), &admin, id, status).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order status updated successfully",
      "order": order,
  })))
}
