// storefront/src/services/mod.rs

//! Business operations. Every function takes its collaborators explicitly
//! (store, asset storage, the acting admin) instead of reading ambient state.

pub mod asset_storage;
pub mod auth_service;
pub mod catalog_service;
pub mod import_request_service;
pub mod order_service;
pub mod rate_limit;

/// Trims and drops empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses an opaque id from a path or payload. Malformed ids can never
/// match a row, so they are reported the same way as missing ones.
pub(crate) fn parse_id(raw: &str) -> Option<uuid::Uuid> {
  uuid::Uuid::parse_str(raw.trim()).ok()
}
