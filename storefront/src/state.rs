// storefront/src/state.rs

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::services::asset_storage::AssetStorage;
use crate::services::auth_service::SessionTokens;
use crate::services::rate_limit::LoginRateLimiter;
use crate::store::Store;

/// Shared per-process state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub assets: Arc<dyn AssetStorage>,
  pub sessions: Arc<SessionTokens>,
  pub login_limiter: Arc<LoginRateLimiter>,
  pub config: Arc<AppConfig>, // Share loaded config
  pub started_at: Instant,
}

impl AppState {
  pub fn new(config: AppConfig, store: Arc<dyn Store>, assets: Arc<dyn AssetStorage>) -> Self {
    let sessions = SessionTokens::new(&config.jwt_secret, config.jwt_ttl);
    let login_limiter = LoginRateLimiter::new(config.login_rate_limit_max, config.login_rate_limit_window);
    Self {
      store,
      assets,
      sessions: Arc::new(sessions),
      login_limiter: Arc::new(login_limiter),
      config: Arc::new(config),
      started_at: Instant::now(),
    }
  }
}
