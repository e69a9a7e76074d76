// storefront/src/main.rs

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http, web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use storefront::config::{AppConfig, LogFormat};
use storefront::services::asset_storage::{AssetStorage, LocalAssetStorage};
use storefront::services::auth_service;
use storefront::state::AppState;
use storefront::store::{MemoryStore, PgStore, Store};
use storefront::web::configure_app_routes;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // Allow RUST_LOG override
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
  if config.uses_memory_store() {
    tracing::warn!("Using the in-memory store; data is lost on restart.");
    return Ok(Arc::new(MemoryStore::new()));
  }

  let store = PgStore::connect(&config.database_url)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");
  store.migrate().await.context("Failed to run database migrations")?;
  tracing::info!("Database migrations applied.");
  Ok(Arc::new(store))
}

async fn seed_admin(config: &AppConfig, store: &dyn Store) -> anyhow::Result<()> {
  match (&config.admin_email, &config.admin_password) {
    (Some(email), Some(password)) => {
      auth_service::seed_admin(store, email, password)
        .await
        .context("Failed to seed the admin account")?;
    }
    _ => tracing::warn!("SEED_DB is set but ADMIN_EMAIL/ADMIN_PASSWORD are missing; skipping admin seed."),
  }
  Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Configuration is loaded before the subscriber exists so the log format
  // can come from it.
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let store = open_store(&app_config).await?;
  if app_config.seed_db {
    seed_admin(&app_config, store.as_ref()).await?;
  }

  let local_assets = LocalAssetStorage::new(&app_config.upload_dir);
  local_assets
    .ensure_root()
    .await
    .with_context(|| format!("Failed to create upload directory {}", app_config.upload_dir.display()))?;
  let assets: Arc<dyn AssetStorage> = Arc::new(local_assets);

  let server_address = app_config.bind_address();
  let upload_dir = app_config.upload_dir.clone();
  let frontend_url = app_config.frontend_url.clone();
  let app_state = AppState::new(app_config, store, assets);

  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    let cors = Cors::default()
      .allowed_origin(&frontend_url)
      .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
      .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE, http::header::ACCEPT])
      .supports_credentials()
      .max_age(3600);

    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(cors)
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
      .service(Files::new("/uploads", upload_dir.clone()))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  Ok(())
}
