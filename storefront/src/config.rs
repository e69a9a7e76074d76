// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `postgres://...`, or `memory://` for the in-process store.
  pub database_url: String,
  pub jwt_secret: String,
  pub jwt_ttl: Duration,
  pub upload_dir: PathBuf,
  pub max_upload_bytes: usize,
  pub frontend_url: String,
  pub login_rate_limit_max: usize,
  pub login_rate_limit_window: Duration,
  pub log_format: LogFormat,

  pub seed_db: bool,
  pub admin_email: Option<String>,
  pub admin_password: Option<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_env("SERVER_PORT", "5002")?;
    let database_url = get_env("DATABASE_URL")?;
    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.trim().is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }
    let jwt_ttl_hours: u64 = parse_env("JWT_TTL_HOURS", "24")?;
    let jwt_ttl = jwt_ttl_hours
      .checked_mul(3600)
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
      .ok_or_else(|| AppError::Config(format!("JWT_TTL_HOURS must be between 1 and {}", u64::MAX / 3600)))?;
    let upload_dir = PathBuf::from(get_env("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
    let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", "5242880")?;
    let frontend_url = get_env("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let login_rate_limit_max = parse_env("LOGIN_RATE_LIMIT_MAX", "5")?;
    let login_rate_limit_window_secs: u64 = parse_env("LOGIN_RATE_LIMIT_WINDOW_SECS", "900")?;

    let log_format = match get_env("LOG_FORMAT").unwrap_or_default().to_ascii_lowercase().as_str() {
      "" | "pretty" | "text" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT value: {}", other))),
    };

    let seed_db = parse_env("SEED_DB", "false")?;
    let admin_email = get_env("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty());
    let admin_password = get_env("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      jwt_ttl,
      upload_dir,
      max_upload_bytes,
      frontend_url,
      login_rate_limit_max,
      login_rate_limit_window: Duration::from_secs(login_rate_limit_window_secs),
      log_format,
      seed_db,
      admin_email,
      admin_password,
    })
  }

  pub fn uses_memory_store(&self) -> bool {
    self.database_url.starts_with("memory:")
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_env<T>(var_name: &str, default: &str) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  env::var(var_name)
    .unwrap_or_else(|_| default.to_string())
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))
}
