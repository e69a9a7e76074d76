// storefront/src/web/handlers/import_request_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use super::order_handlers::StatusPayload;
use crate::errors::AppError;
use crate::services::{import_request_service, parse_id};
use crate::state::AppState;
use crate::validation::{validate_import_request, validate_import_request_query, ImportRequestPayload, ListQuery};
use crate::web::extractors::AdminUser;

fn import_request_not_found() -> AppError {
  AppError::NotFound("Import request not found".to_string())
}

#[instrument(name = "handler::create_import_request", skip(app_state, req_payload))]
pub async fn create_import_request_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ImportRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let request = validate_import_request(&req_payload)?;
  let created = import_request_service::create_import_request(app_state.store.as_ref(), request).await?;
  Ok(HttpResponse::Created().json(json!({
      "message": "Import request submitted successfully",
      "request": created,
  })))
}

#[instrument(name = "handler::list_import_requests", skip(app_state, admin), fields(admin = %admin.email))]
pub async fn list_import_requests_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
  let (filter, page) = validate_import_request_query(&query)?;
  let requests =
    import_request_service::list_import_requests(app_state.store.as_ref(), &admin, &filter, page).await?;
  let pagination = requests.pagination(page);
  Ok(HttpResponse::Ok().json(json!({
      "requests": requests.items,
      "pagination": pagination,
  })))
}

#[instrument(
  name = "handler::get_import_request",
  skip(app_state, admin, path),
  fields(import_request_id = %path.as_str())
)]
pub async fn get_import_request_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path).ok_or_else(import_request_not_found)?;
  let request = import_request_service::get_import_request(app_state.store.as_ref(), &admin, id).await?;
  Ok(HttpResponse::Ok().json(request))
}

#[instrument(
  name = "handler::update_import_request_status",
  skip(app_state, admin, path, req_payload),
  fields(admin = %admin.email, import_request_id = %path.as_str(), status = ?req_payload.status)
)]
pub async fn update_import_request_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
  req_payload: web::Json<StatusPayload>,
) -> Result<HttpResponse, AppError> {
  let status = import_request_service::parse_import_request_status(req_payload.status.as_deref())?;
  let id = parse_id(&path).ok_or_else(import_request_not_found)?;
  let request =
    import_request_service::update_import_request_status(app_state.store.as_ref(), &admin, id, status).await?;
  Ok(HttpResponse::Ok().json(request))
}
