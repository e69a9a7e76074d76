// storefront/src/web/handlers/product_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::models::{Page, PageRequest, Product};
use crate::services::asset_storage::{is_accepted_image, UploadedImage};
use crate::services::{catalog_service, parse_id};
use crate::state::AppState;
use crate::validation::{validate_new_product, validate_product_changes, validate_product_query, FormFields, ListQuery};
use crate::web::extractors::AdminUser;

/// Text fields plus the optional `image` part of a product form.
struct ProductForm {
  fields: FormFields,
  image: Option<UploadedImage>,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
  AppError::validation(format!("Invalid multipart payload: {}", e))
}

async fn read_product_form(mut payload: Multipart, max_upload_bytes: usize) -> Result<ProductForm, AppError> {
  let mut form = ProductForm {
    fields: FormFields::new(),
    image: None,
  };

  while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
    let name = field.name().unwrap_or_default().to_string();

    if name == "image" {
      let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();
      let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string);
      if !is_accepted_image(&content_type, file_name.as_deref()) {
        return Err(AppError::validation("Only image files are allowed"));
      }

      let mut bytes = Vec::new();
      while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > max_upload_bytes {
          return Err(AppError::validation(format!(
            "Image exceeds the maximum size of {} bytes",
            max_upload_bytes
          )));
        }
        bytes.extend_from_slice(&chunk);
      }
      // An empty file input is submitted as a zero-length part.
      if !bytes.is_empty() {
        form.image = Some(UploadedImage {
          file_name,
          content_type,
          bytes,
        });
      }
      continue;
    }

    let mut value = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
      value.extend_from_slice(&chunk);
    }
    let value = String::from_utf8(value).map_err(|_| AppError::validation(format!("Field '{}' is not valid UTF-8", name)))?;
    debug!(field = %name, "Form field received.");
    form.fields.insert(name, value);
  }

  Ok(form)
}

fn product_list_response(page: Page<Product>, request: PageRequest) -> HttpResponse {
  let pagination = page.pagination(request);
  HttpResponse::Ok().json(json!({
      "products": page.items,
      "pagination": pagination,
  }))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
  let (filter, page) = validate_product_query(&query, true)?;
  let products = catalog_service::list_products(app_state.store.as_ref(), &filter, page).await?;
  Ok(product_list_response(products, page))
}

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = catalog_service::list_categories(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(categories))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path).ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  let product = catalog_service::get_product(app_state.store.as_ref(), id, true).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::admin_list_products", skip(app_state, admin), fields(admin = %admin.email))]
pub async fn admin_list_products_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
  let (filter, page) = validate_product_query(&query, false)?;
  let products = catalog_service::list_products(app_state.store.as_ref(), &filter, page).await?;
  Ok(product_list_response(products, page))
}

#[instrument(name = "handler::create_product", skip(app_state, admin, payload), fields(admin = %admin.email))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let form = read_product_form(payload, app_state.config.max_upload_bytes).await?;
  let product = validate_new_product(&form.fields)?;
  let created = catalog_service::create_product(
    app_state.store.as_ref(),
    app_state.assets.as_ref(),
    &admin,
    product,
    form.image,
  )
  .await?;
  Ok(HttpResponse::Created().json(created))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, admin, path, payload),
  fields(admin = %admin.email, product_id = %path.as_str())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let form = read_product_form(payload, app_state.config.max_upload_bytes).await?;
  let changes = validate_product_changes(&form.fields)?;
  let id = parse_id(&path).ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  let updated = catalog_service::update_product(
    app_state.store.as_ref(),
    app_state.assets.as_ref(),
    &admin,
    id,
    changes,
    form.image,
  )
  .await?;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, admin, path),
  fields(admin = %admin.email, product_id = %path.as_str())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path).ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  catalog_service::delete_product(app_state.store.as_ref(), app_state.assets.as_ref(), &admin, id).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
