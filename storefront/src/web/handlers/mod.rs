// storefront/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod health_handlers;
pub mod import_request_handlers;
pub mod order_handlers;
pub mod product_handlers;
