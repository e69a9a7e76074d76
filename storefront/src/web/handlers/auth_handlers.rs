// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use crate::validation::{validate_login, LoginPayload};

/// Rate-limit key for a request: the peer IP, without the port.
fn client_key(req: &HttpRequest) -> String {
  req
    .peer_addr()
    .map(|addr| addr.ip().to_string())
    .unwrap_or_else(|| "unknown".to_string())
}

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  req: HttpRequest,
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  app_state.login_limiter.check(&client_key(&req))?;

  let credentials = validate_login(&req_payload)?;
  let outcome = auth_service::login(
    app_state.store.as_ref(),
    &app_state.sessions,
    &credentials.email,
    &credentials.password,
  )
  .await?;

  Ok(HttpResponse::Ok().json(outcome))
}
