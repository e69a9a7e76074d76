// storefront/src/web/routes.rs

use actix_web::{error, web, HttpRequest};

use crate::errors::AppError;
use crate::web::handlers::{
  auth_handlers, health_handlers, import_request_handlers, order_handlers, product_handlers,
};

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::validation(format!("Invalid JSON body: {}", err)).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::validation(format!("Invalid query string: {}", err)).into()
}

fn path_error_handler(_err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::NotFound("Resource not found".to_string()).into()
}

// Called from `main.rs` and from the HTTP integration tests.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_handlers::health_check_handler))
        .service(web::scope("/auth").route("/login", web::post().to(auth_handlers::login_handler)))
        // Literal segments are registered before `/{id}` so they are not
        // captured as product ids.
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("/categories", web::get().to(product_handlers::list_categories_handler))
            .route("/admin/all", web::get().to(product_handlers::admin_list_products_handler))
            .route("/admin", web::post().to(product_handlers::create_product_handler))
            .route("/admin/{id}", web::put().to(product_handlers::update_product_handler))
            .route("/admin/{id}", web::delete().to(product_handlers::delete_product_handler))
            .route("/{id}", web::get().to(product_handlers::get_product_handler)),
        )
        .service(
          web::scope("/orders")
            .route("", web::post().to(order_handlers::create_order_handler))
            .route("", web::get().to(order_handlers::list_orders_handler))
            .route("/{id}", web::get().to(order_handlers::get_order_handler))
            .route("/{id}/status", web::patch().to(order_handlers::update_order_status_handler)),
        )
        .service(
          web::scope("/import-requests")
            .route("", web::post().to(import_request_handlers::create_import_request_handler))
            .route("/admin", web::get().to(import_request_handlers::list_import_requests_handler))
            .route("/admin/{id}", web::get().to(import_request_handlers::get_import_request_handler))
            .route(
              "/admin/{id}/status",
              web::put().to(import_request_handlers::update_import_request_status_handler),
            ),
        ),
    );
}
