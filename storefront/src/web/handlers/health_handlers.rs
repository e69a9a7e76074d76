// storefront/src/web/handlers/health_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "status": "OK",
      "timestamp": Utc::now(),
      "uptime": app_state.started_at.elapsed().as_secs_f64(),
  }))
}
