// storefront/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single field-level validation failure, surfaced in the `details` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      message: message.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {message}")]
  Validation {
    message: String,
    details: Vec<FieldError>,
  },

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Product out of stock")]
  OutOfStock,

  #[error("Insufficient stock: only {available} available")]
  InsufficientStock { available: i32 },

  #[error("Authentication Failed")]
  Authentication,

  #[error("Access token required")]
  MissingToken,

  #[error("Invalid or expired token")]
  InvalidToken,

  #[error("Admin access required")]
  Forbidden,

  #[error("Too many login attempts")]
  RateLimited,

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Validation failure without field detail (service-level checks).
  pub fn validation(message: impl Into<String>) -> Self {
    AppError::Validation {
      message: message.into(),
      details: Vec::new(),
    }
  }

  /// Validation failure produced by the field validation layer.
  pub fn invalid_fields(details: Vec<FieldError>) -> Self {
    AppError::Validation {
      message: "Validation failed".to_string(),
      details,
    }
  }

  pub fn is_internal(&self) -> bool {
    matches!(
      self,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_)
    )
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation { .. } | AppError::OutOfStock | AppError::InsufficientStock { .. } => {
        StatusCode::BAD_REQUEST
      }
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Authentication | AppError::MissingToken => StatusCode::UNAUTHORIZED,
      AppError::InvalidToken | AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if self.is_internal() {
      // Full detail stays in the server log only.
      tracing::error!(application_error = %self, "Responding with internal error");
    } else {
      tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let body = match self {
      AppError::Validation { message, details } if details.is_empty() => {
        json!({"error": "Validation failed", "message": message})
      }
      AppError::Validation { message, details } => json!({"error": message, "details": details}),
      AppError::NotFound(m) => json!({"error": m}),
      AppError::OutOfStock => json!({
        "error": "Product out of stock",
        "message": "This product is currently out of stock"
      }),
      AppError::InsufficientStock { available } => json!({
        "error": "Insufficient stock",
        "message": format!("Only {} items available in stock", available)
      }),
      AppError::Authentication => json!({"error": "Invalid email or password"}),
      AppError::MissingToken => json!({"error": "Access token required"}),
      AppError::InvalidToken => json!({"error": "Invalid or expired token"}),
      AppError::Forbidden => json!({"error": "Admin access required"}),
      AppError::RateLimited => json!({"error": "Too many login attempts, please try again later"}),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => {
        json!({"error": "Internal server error"})
      }
    };

    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
