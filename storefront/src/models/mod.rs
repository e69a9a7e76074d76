// storefront/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod import_request;
pub mod order;
pub mod pagination;
pub mod product;
pub mod user;

// Re-export the model structs for convenient access
pub use import_request::{ImportRequest, ImportRequestStatus, NewImportRequest};
pub use order::{NewOrder, Order, OrderStatus};
pub use pagination::{Page, PageRequest, Pagination};
pub use product::{NewProduct, Product, ProductChanges};
pub use user::{Role, User};

/// Error returned when a status string is not one of the enum's values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);
