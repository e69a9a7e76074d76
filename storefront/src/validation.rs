// storefront/src/validation.rs

//! Field-level request validation, run before any service logic.
//!
//! Each validator collects every failing field into `FieldError`s and
//! returns an `AppError::Validation` carrying them all, or the cleaned and
//! coerced value the service layer expects.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::{AppError, FieldError, Result};
use crate::models::{ImportRequestStatus, NewImportRequest, NewProduct, OrderStatus, PageRequest, ProductChanges};
use crate::services::catalog_service::{coerce_price, coerce_quantity};
use crate::store::{ImportRequestFilter, OrderFilter, ProductFilter};

/// Text parts of a multipart product form.
pub type FormFields = HashMap<String, String>;

#[derive(Default)]
struct Checks {
  errors: Vec<FieldError>,
}

impl Checks {
  fn fail(&mut self, field: &str, message: &str) {
    self.errors.push(FieldError::new(field, message));
  }

  fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T> {
    if self.errors.is_empty() {
      Ok(value())
    } else {
      Err(AppError::invalid_fields(self.errors))
    }
  }

  /// Required string with a length range (in characters).
  fn required(&mut self, field: &str, value: Option<&str>, min: usize, max: usize, message: &str) -> String {
    let trimmed = value.map(str::trim).unwrap_or_default();
    let len = trimmed.chars().count();
    if len < min || len > max {
      self.fail(field, message);
    }
    trimmed.to_string()
  }

  /// Optional string with a maximum length. Blank input counts as absent.
  fn optional(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) -> Option<String> {
    let trimmed = value.map(str::trim)?;
    if trimmed.chars().count() > max {
      self.fail(field, message);
    }
    Some(trimmed.to_string()).filter(|v| !v.is_empty())
  }
}

/// Loose structural e-mail check: one `@`, a non-empty local part, and a
/// dotted domain without whitespace.
pub fn is_valid_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && local.len() <= 64
    && !domain.contains('@')
    && !email.chars().any(char::is_whitespace)
    && domain.split('.').count() >= 2
    && domain.split('.').all(|label| {
      !label.is_empty() && !label.starts_with('-') && !label.ends_with('-') && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

/// Phone numbers: optional leading `+`, digits with common separators,
/// 7 to 15 digits in total.
pub fn is_valid_phone(phone: &str) -> bool {
  let body = phone.strip_prefix('+').unwrap_or(phone);
  let digits = body.chars().filter(char::is_ascii_digit).count();
  (7..=15).contains(&digits)
    && body
      .chars()
      .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.'))
}

/// Lower-cased, trimmed e-mail as used for account lookups.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn parse_strict_int(raw: &str) -> Option<i64> {
  let trimmed = raw.trim();
  let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  trimmed.parse().ok()
}

/// Integers arrive either as JSON numbers or numeric strings.
fn int_value(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => parse_strict_int(s),
    _ => None,
  }
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw.trim() {
    "true" | "1" => Some(true),
    "false" | "0" => Some(false),
    _ => None,
  }
}

fn is_non_negative_float(raw: &str) -> bool {
  raw.trim().parse::<f64>().is_ok_and(|p| p.is_finite() && p >= 0.0)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

pub fn validate_login(payload: &LoginPayload) -> Result<Credentials> {
  let mut checks = Checks::default();
  let email = normalize_email(payload.email.as_deref().unwrap_or_default());
  if !is_valid_email(&email) {
    checks.fail("email", "Valid email is required");
  }
  let password = payload.password.clone().unwrap_or_default();
  if password.chars().count() < 6 {
    checks.fail("password", "Password must be at least 6 characters");
  }
  checks.finish(|| Credentials { email, password })
}

pub fn validate_new_product(form: &FormFields) -> Result<NewProduct> {
  let mut checks = Checks::default();
  let field = |name: &str| form.get(name).map(String::as_str);

  let name = checks.required(
    "name",
    field("name"),
    1,
    255,
    "Product name is required and must be less than 255 characters",
  );
  let description = checks.optional(
    "description",
    field("description"),
    1000,
    "Description must be less than 1000 characters",
  );
  let quantity_raw = field("quantity").map(str::trim).filter(|v| !v.is_empty());
  if quantity_raw.is_some_and(|q| parse_strict_int(q).map_or(true, |q| q < 0 || q > i64::from(i32::MAX))) {
    checks.fail("quantity", "Quantity must be a non-negative integer");
  }
  let price_raw = field("price").map(str::trim).filter(|v| !v.is_empty());
  if price_raw.is_some_and(|p| !is_non_negative_float(p)) {
    checks.fail("price", "Price must be a positive number");
  }
  let category = checks.optional("category", field("category"), 100, "Category must be less than 100 characters");
  let brand = checks.optional("brand", field("brand"), 100, "Brand must be less than 100 characters");
  let part_number = checks.required(
    "partNumber",
    field("partNumber"),
    1,
    50,
    "Part number is required and must be less than 50 characters",
  );

  checks.finish(|| NewProduct {
    name,
    description,
    quantity: coerce_quantity(quantity_raw),
    price: coerce_price(price_raw),
    category,
    brand,
    part_number,
    image: None,
  })
}

pub fn validate_product_changes(form: &FormFields) -> Result<ProductChanges> {
  let mut checks = Checks::default();
  let field = |name: &str| form.get(name).map(String::as_str);

  let name = field("name").map(|v| {
    checks.required("name", Some(v), 1, 255, "Product name must be less than 255 characters")
  });
  let description = field("description").map(|v| {
    checks.optional("description", Some(v), 1000, "Description must be less than 1000 characters");
    v.trim().to_string()
  });
  let quantity = match field("quantity").map(str::trim) {
    None => None,
    Some(raw) => match parse_strict_int(raw).and_then(|q| i32::try_from(q).ok()).filter(|q| *q >= 0) {
      Some(q) => Some(q),
      None => {
        checks.fail("quantity", "Quantity must be a non-negative integer");
        None
      }
    },
  };
  let price = match field("price").map(str::trim) {
    None => None,
    Some(raw) if is_non_negative_float(raw) => Some(coerce_price(Some(raw))),
    Some(_) => {
      checks.fail("price", "Price must be a positive number");
      None
    }
  };
  let category = field("category").map(|v| {
    checks.optional("category", Some(v), 100, "Category must be less than 100 characters");
    v.trim().to_string()
  });
  let brand = field("brand").map(|v| {
    checks.optional("brand", Some(v), 100, "Brand must be less than 100 characters");
    v.trim().to_string()
  });
  let part_number = field("partNumber").map(|v| {
    checks.required("partNumber", Some(v), 1, 50, "Part number must be less than 50 characters")
  });
  let is_active = match field("isActive") {
    None => None,
    Some(raw) => match parse_bool(raw) {
      Some(b) => Some(b),
      None => {
        checks.fail("isActive", "isActive must be a boolean");
        None
      }
    },
  };

  checks.finish(|| ProductChanges {
    name,
    description,
    quantity,
    price,
    category,
    brand,
    part_number,
    image: None,
    is_active,
  })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequestPayload {
  pub customer_name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub car_make: Option<String>,
  pub car_model: Option<String>,
  pub car_year: Option<Value>,
  pub part_name: Option<String>,
  pub description: Option<String>,
  pub quantity: Option<Value>,
  pub additional_notes: Option<String>,
}

pub fn validate_import_request(payload: &ImportRequestPayload) -> Result<NewImportRequest> {
  let mut checks = Checks::default();

  let customer_name = checks.required(
    "customerName",
    payload.customer_name.as_deref(),
    1,
    100,
    "Customer name is required and must be less than 100 characters",
  );
  let email = normalize_email(payload.email.as_deref().unwrap_or_default());
  if !is_valid_email(&email) {
    checks.fail("email", "Valid email is required");
  }
  let phone = payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
  if phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
    checks.fail("phone", "Valid phone number is required");
  }
  let car_make = checks.required(
    "carMake",
    payload.car_make.as_deref(),
    1,
    50,
    "Car make is required and must be less than 50 characters",
  );
  let car_model = checks.required(
    "carModel",
    payload.car_model.as_deref(),
    1,
    50,
    "Car model is required and must be less than 50 characters",
  );
  let max_year = i64::from(Utc::now().year()) + 1;
  let car_year = payload
    .car_year
    .as_ref()
    .and_then(int_value)
    .filter(|y| (1900..=max_year).contains(y))
    .and_then(|y| i32::try_from(y).ok());
  if car_year.is_none() {
    checks.fail("carYear", "Valid car year is required");
  }
  let part_name = checks.required(
    "partName",
    payload.part_name.as_deref(),
    1,
    100,
    "Part name is required and must be less than 100 characters",
  );
  let description = checks.optional(
    "description",
    payload.description.as_deref(),
    500,
    "Description must be less than 500 characters",
  );
  let quantity = match payload.quantity.as_ref().filter(|v| !v.is_null()) {
    None => None,
    Some(v) => match int_value(v).filter(|q| *q >= 1).and_then(|q| i32::try_from(q).ok()) {
      Some(q) => Some(q),
      None => {
        checks.fail("quantity", "Quantity must be a positive integer");
        None
      }
    },
  };
  let additional_notes = checks.optional(
    "additionalNotes",
    payload.additional_notes.as_deref(),
    1000,
    "Additional notes must be less than 1000 characters",
  );

  checks.finish(|| NewImportRequest {
    customer_name,
    email,
    phone,
    car_make,
    car_model,
    car_year: car_year.unwrap_or_default(),
    part_name,
    description,
    quantity,
    additional_notes,
  })
}

/// Raw listing query string; everything arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
  pub q: Option<String>,
  pub category: Option<String>,
  pub status: Option<String>,
  pub page: Option<String>,
  pub limit: Option<String>,
}

struct ListParams {
  search: Option<String>,
  category: Option<String>,
  page: PageRequest,
}

fn validate_list_params(query: &ListQuery, default_limit: u32, checks: &mut Checks) -> ListParams {
  let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(str::to_string);
  if search.as_deref().is_some_and(|q| q.chars().count() > 100) {
    checks.fail("q", "Search query must be between 1 and 100 characters");
  }
  let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);
  if category.as_deref().is_some_and(|c| c.chars().count() > 100) {
    checks.fail("category", "Category must be less than 100 characters");
  }

  let page = match query.page.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
    None => 1,
    Some(raw) => match parse_strict_int(raw).filter(|p| *p >= 1).and_then(|p| u32::try_from(p).ok()) {
      Some(p) => p,
      None => {
        checks.fail("page", "Page must be a positive integer");
        1
      }
    },
  };
  let limit = match query.limit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
    None => default_limit,
    Some(raw) => match parse_strict_int(raw).filter(|l| (1..=100).contains(l)) {
      Some(l) => l as u32,
      None => {
        checks.fail("limit", "Limit must be between 1 and 100");
        default_limit
      }
    },
  };

  ListParams {
    search,
    category,
    page: PageRequest::new(page, limit),
  }
}

pub fn validate_product_query(query: &ListQuery, active_only: bool) -> Result<(ProductFilter, PageRequest)> {
  let mut checks = Checks::default();
  let params = validate_list_params(query, PageRequest::DEFAULT_PRODUCT_LIMIT, &mut checks);
  checks.finish(|| {
    (
      ProductFilter {
        search: params.search,
        category: params.category,
        active_only,
      },
      params.page,
    )
  })
}

pub fn validate_order_query(query: &ListQuery) -> Result<(OrderFilter, PageRequest)> {
  let mut checks = Checks::default();
  let params = validate_list_params(query, PageRequest::DEFAULT_ORDER_LIMIT, &mut checks);
  let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    None => None,
    Some(raw) => match raw.parse::<OrderStatus>() {
      Ok(status) => Some(status),
      Err(_) => {
        checks.fail("status", "Status must be one of: PENDING, PROCESSING, COMPLETED, CANCELLED");
        None
      }
    },
  };
  checks.finish(|| (OrderFilter { status }, params.page))
}

pub fn validate_import_request_query(query: &ListQuery) -> Result<(ImportRequestFilter, PageRequest)> {
  let mut checks = Checks::default();
  let params = validate_list_params(query, PageRequest::DEFAULT_IMPORT_REQUEST_LIMIT, &mut checks);
  let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    None => None,
    Some(raw) => match raw.parse::<ImportRequestStatus>() {
      Ok(status) => Some(status),
      Err(_) => {
        checks.fail("status", "Status must be one of: PENDING, PROCESSING, COMPLETED, REJECTED");
        None
      }
    },
  };
  checks.finish(|| {
    (
      ImportRequestFilter {
        status,
        search: params.search,
      },
      params.page,
    )
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn form(pairs: &[(&str, &str)]) -> FormFields {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn failed_fields(err: AppError) -> Vec<String> {
    match err {
      AppError::Validation { details, .. } => details.into_iter().map(|d| d.field).collect(),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  fn import_payload() -> ImportRequestPayload {
    serde_json::from_value(json!({
      "customerName": "Sam Carter",
      "email": "Sam@Example.com",
      "carMake": "Toyota",
      "carModel": "Corolla",
      "carYear": 2012,
      "partName": "Alternator"
    }))
    .unwrap()
  }

  #[test]
  fn emails() {
    assert!(is_valid_email("admin@example.com"));
    assert!(is_valid_email("first.last+tag@shop.co.uk"));
    assert!(!is_valid_email("admin@localhost"));
    assert!(!is_valid_email("admin example.com"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("a@b@example.com"));
  }

  #[test]
  fn phones() {
    assert!(is_valid_phone("+1 (555) 010-0199"));
    assert!(is_valid_phone("0501234567"));
    assert!(!is_valid_phone("12345"));
    assert!(!is_valid_phone("call me maybe"));
  }

  #[test]
  fn login_normalizes_email_and_checks_password_length() {
    let creds = validate_login(&LoginPayload {
      email: Some("  Admin@Example.COM ".into()),
      password: Some("secret1".into()),
    })
    .unwrap();
    assert_eq!(creds.email, "admin@example.com");

    let err = validate_login(&LoginPayload {
      email: Some("nope".into()),
      password: Some("12345".into()),
    })
    .unwrap_err();
    assert_eq!(failed_fields(err), vec!["email", "password"]);
  }

  #[test]
  fn new_product_coerces_numbers() {
    let product = validate_new_product(&form(&[
      ("name", " Brake Pad "),
      ("partNumber", "BP-100"),
      ("quantity", "7"),
      ("price", "19.5"),
    ]))
    .unwrap();
    assert_eq!(product.name, "Brake Pad");
    assert_eq!(product.quantity, 7);
    assert_eq!(product.price, 19.5);
    assert_eq!(product.description, None);
  }

  #[test]
  fn new_product_defaults_missing_numbers_to_zero() {
    let product = validate_new_product(&form(&[("name", "Filter"), ("partNumber", "F-1")])).unwrap();
    assert_eq!(product.quantity, 0);
    assert_eq!(product.price, 0.0);
  }

  #[test]
  fn new_product_rejects_bad_fields() {
    let long_name = "x".repeat(256);
    let err = validate_new_product(&form(&[
      ("name", &long_name),
      ("quantity", "-1"),
      ("price", "cheap"),
    ]))
    .unwrap_err();
    assert_eq!(failed_fields(err), vec!["name", "quantity", "price", "partNumber"]);
  }

  #[test]
  fn product_changes_are_partial() {
    let changes = validate_product_changes(&form(&[("price", "12.25"), ("isActive", "false")])).unwrap();
    assert_eq!(changes.price, Some(12.25));
    assert_eq!(changes.is_active, Some(false));
    assert_eq!(changes.name, None);
    assert_eq!(changes.quantity, None);
  }

  #[test]
  fn product_changes_reject_non_boolean_active_flag() {
    let err = validate_product_changes(&form(&[("isActive", "maybe"), ("name", "")])).unwrap_err();
    assert_eq!(failed_fields(err), vec!["name", "isActive"]);
  }

  #[test]
  fn import_request_accepts_year_as_string_or_number() {
    let mut payload = import_payload();
    let request = validate_import_request(&payload).unwrap();
    assert_eq!(request.car_year, 2012);
    assert_eq!(request.email, "sam@example.com");

    payload.car_year = Some(json!("1999"));
    assert_eq!(validate_import_request(&payload).unwrap().car_year, 1999);
  }

  #[test]
  fn import_request_year_bounds() {
    let next_year = Utc::now().year() + 1;
    for (year, ok) in [(1899, false), (1900, true), (next_year, true), (next_year + 1, false)] {
      let mut payload = import_payload();
      payload.car_year = Some(json!(year));
      assert_eq!(validate_import_request(&payload).is_ok(), ok, "year {}", year);
    }
  }

  #[test]
  fn import_request_rejects_bad_phone_and_long_description() {
    let mut payload = import_payload();
    payload.phone = Some("abc".into());
    payload.description = Some("d".repeat(501));
    assert_eq!(
      failed_fields(validate_import_request(&payload).unwrap_err()),
      vec!["phone", "description"]
    );
  }

  #[test]
  fn list_query_defaults_and_bounds() {
    let (filter, page) = validate_product_query(&ListQuery::default(), true).unwrap();
    assert!(filter.active_only);
    assert_eq!(page, PageRequest::new(1, 20));

    let (_, page) = validate_order_query(&ListQuery::default()).unwrap();
    assert_eq!(page.limit, 10);

    let bad = ListQuery {
      page: Some("0".into()),
      limit: Some("101".into()),
      ..ListQuery::default()
    };
    assert_eq!(failed_fields(validate_product_query(&bad, true).unwrap_err()), vec!["page", "limit"]);
  }

  #[test]
  fn list_query_rejects_unknown_status() {
    let query = ListQuery {
      status: Some("SHIPPED".into()),
      ..ListQuery::default()
    };
    assert!(validate_order_query(&query).is_err());
    let query = ListQuery {
      status: Some("REJECTED".into()),
      ..ListQuery::default()
    };
    assert_eq!(
      validate_import_request_query(&query).unwrap().0.status,
      Some(ImportRequestStatus::Rejected)
    );
  }
}
