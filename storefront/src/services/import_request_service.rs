// storefront/src/services/import_request_service.rs

use tracing::{info, instrument};
use uuid::Uuid;

use super::auth_service::Identity;
use crate::errors::{AppError, Result};
use crate::models::{ImportRequest, ImportRequestStatus, NewImportRequest, Page, PageRequest};
use crate::store::{ImportRequestFilter, Store};

fn import_request_not_found() -> AppError {
  AppError::NotFound("Import request not found".to_string())
}

/// Stores a validated sourcing request with status PENDING.
#[instrument(
  name = "import_request_service::create",
  skip(store, request),
  fields(part_name = %request.part_name, car_make = %request.car_make)
)]
pub async fn create_import_request(store: &dyn Store, request: NewImportRequest) -> Result<ImportRequest> {
  let created = store.insert_import_request(request).await?;
  info!(import_request_id = %created.id, "Import request submitted.");
  Ok(created)
}

#[instrument(name = "import_request_service::list", skip(store, admin), fields(admin = %admin.email))]
pub async fn list_import_requests(
  store: &dyn Store,
  admin: &Identity,
  filter: &ImportRequestFilter,
  page: PageRequest,
) -> Result<Page<ImportRequest>> {
  store.list_import_requests(filter, page).await
}

pub async fn get_import_request(store: &dyn Store, _admin: &Identity, id: Uuid) -> Result<ImportRequest> {
  store.find_import_request(id).await?.ok_or_else(import_request_not_found)
}

pub fn parse_import_request_status(raw: Option<&str>) -> Result<ImportRequestStatus> {
  raw
    .map(str::trim)
    .and_then(|s| s.parse::<ImportRequestStatus>().ok())
    .ok_or_else(|| AppError::validation("Invalid status"))
}

#[instrument(name = "import_request_service::update_status", skip(store, admin), fields(admin = %admin.email))]
pub async fn update_import_request_status(
  store: &dyn Store,
  admin: &Identity,
  id: Uuid,
  status: ImportRequestStatus,
) -> Result<ImportRequest> {
  let updated = store
    .set_import_request_status(id, status)
    .await?
    .ok_or_else(import_request_not_found)?;
  info!(import_request_id = %updated.id, status = %updated.status, "Import request status updated.");
  Ok(updated)
}
