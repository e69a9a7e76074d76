// storefront/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use std::ops::Deref;
use tracing::warn;

use crate::errors::AppError;
use crate::services::auth_service::Identity;
use crate::state::AppState;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("AppState is not registered with the application".to_string()))?;
  let token = bearer_token(req).ok_or(AppError::MissingToken)?;
  state.sessions.verify(token)
}

/// A session whose role is ADMIN. Authentication failures take precedence
/// over the role check.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl Deref for AdminUser {
  type Target = Identity;

  fn deref(&self) -> &Identity {
    &self.0
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = authenticate(req).and_then(|identity| {
      if identity.is_admin() {
        Ok(AdminUser(identity))
      } else {
        warn!(user_id = %identity.id, path = %req.path(), "Non-admin caller rejected.");
        Err(AppError::Forbidden)
      }
    });
    ready(result)
  }
}
