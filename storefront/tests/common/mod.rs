// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

use storefront::config::{AppConfig, LogFormat};
use storefront::errors::Result;
use storefront::models::{NewImportRequest, NewProduct, Product, ProductChanges, Role};
use storefront::services::asset_storage::{stored_file_name, AssetStorage, UploadedImage, PUBLIC_PREFIX};
use storefront::services::auth_service::Identity;
use storefront::state::AppState;
use storefront::store::{MemoryStore, Store};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Asset storage that keeps images in memory and records removals.
#[derive(Default)]
pub struct MemoryAssetStorage {
  files: Mutex<HashMap<String, Vec<u8>>>,
  removed: Mutex<Vec<String>>,
  fail_removals: bool,
}

impl MemoryAssetStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every `remove` call fails; used to check that cleanup is best-effort.
  pub fn failing_removals() -> Self {
    Self {
      fail_removals: true,
      ..Self::default()
    }
  }

  pub fn contains(&self, reference: &str) -> bool {
    self.files.lock().contains_key(reference)
  }

  pub fn stored_count(&self) -> usize {
    self.files.lock().len()
  }

  pub fn removed(&self) -> Vec<String> {
    self.removed.lock().clone()
  }
}

#[async_trait]
impl AssetStorage for MemoryAssetStorage {
  async fn save_image(&self, image: &UploadedImage) -> Result<String> {
    let reference = format!("{}{}", PUBLIC_PREFIX, stored_file_name(image));
    self.files.lock().insert(reference.clone(), image.bytes.clone());
    Ok(reference)
  }

  async fn remove(&self, reference: &str) -> std::io::Result<()> {
    if self.fail_removals {
      return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"));
    }
    self.files.lock().remove(reference);
    self.removed.lock().push(reference.to_string());
    Ok(())
  }
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "memory://".to_string(),
    jwt_secret: TEST_JWT_SECRET.to_string(),
    jwt_ttl: Duration::from_secs(3600),
    upload_dir: PathBuf::from("uploads"),
    max_upload_bytes: 1024,
    frontend_url: "http://localhost:3000".to_string(),
    login_rate_limit_max: 5,
    login_rate_limit_window: Duration::from_secs(900),
    log_format: LogFormat::Pretty,
    seed_db: false,
    admin_email: None,
    admin_password: None,
  }
}

pub struct TestApp {
  pub store: Arc<MemoryStore>,
  pub assets: Arc<MemoryAssetStorage>,
  pub state: AppState,
}

pub fn test_app() -> TestApp {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let assets = Arc::new(MemoryAssetStorage::new());
  let state = AppState::new(test_config(), store.clone(), assets.clone());
  TestApp { store, assets, state }
}

pub fn admin_identity() -> Identity {
  Identity {
    id: Uuid::new_v4(),
    email: "admin@example.com".to_string(),
    role: Role::Admin,
  }
}

pub fn customer_identity() -> Identity {
  Identity {
    id: Uuid::new_v4(),
    email: "customer@example.com".to_string(),
    role: Role::Customer,
  }
}

pub fn bearer(state: &AppState, identity: &Identity) -> String {
  let token = state.sessions.issue(identity).expect("token");
  format!("Bearer {}", token)
}

pub fn new_product(name: &str, quantity: i32) -> NewProduct {
  NewProduct {
    name: name.to_string(),
    description: Some(format!("{} for most sedans", name)),
    quantity,
    price: 24.5,
    category: Some("Brakes".to_string()),
    brand: Some("Bosch".to_string()),
    part_number: format!("PN-{}", name.replace(' ', "-")),
    image: None,
  }
}

pub async fn insert_product(store: &dyn Store, product: NewProduct) -> Product {
  store.insert_product(product).await.expect("insert product")
}

pub async fn deactivate_product(store: &dyn Store, id: Uuid) {
  let changes = ProductChanges {
    is_active: Some(false),
    ..ProductChanges::default()
  };
  store.update_product(id, &changes).await.expect("deactivate product");
}

pub fn png(file_name: &str) -> UploadedImage {
  UploadedImage {
    file_name: Some(file_name.to_string()),
    content_type: "image/png".to_string(),
    bytes: vec![0x89, b'P', b'N', b'G'],
  }
}

pub fn new_import_request(part_name: &str) -> NewImportRequest {
  NewImportRequest {
    customer_name: "Sam Carter".to_string(),
    email: "sam@example.com".to_string(),
    phone: Some("+1 555 010 0199".to_string()),
    car_make: "Toyota".to_string(),
    car_model: "Corolla".to_string(),
    car_year: 2012,
    part_name: part_name.to_string(),
    description: None,
    quantity: Some(1),
    additional_notes: None,
  }
}
