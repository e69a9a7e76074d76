// storefront/src/models/import_request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "import_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportRequestStatus {
  Pending,
  Processing,
  Completed,
  Rejected,
}

impl ImportRequestStatus {
  pub const ALL: [ImportRequestStatus; 4] = [
    ImportRequestStatus::Pending,
    ImportRequestStatus::Processing,
    ImportRequestStatus::Completed,
    ImportRequestStatus::Rejected,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ImportRequestStatus::Pending => "PENDING",
      ImportRequestStatus::Processing => "PROCESSING",
      ImportRequestStatus::Completed => "COMPLETED",
      ImportRequestStatus::Rejected => "REJECTED",
    }
  }
}

impl fmt::Display for ImportRequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ImportRequestStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ImportRequestStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
  pub id: Uuid,
  pub customer_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub car_make: String,
  pub car_model: String,
  pub car_year: i32,
  pub part_name: String,
  pub description: Option<String>,
  pub quantity: Option<i32>,
  pub additional_notes: Option<String>,
  pub status: ImportRequestStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImportRequest {
  pub customer_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub car_make: String,
  pub car_model: String,
  pub car_year: i32,
  pub part_name: String,
  pub description: Option<String>,
  pub quantity: Option<i32>,
  pub additional_notes: Option<String>,
}
