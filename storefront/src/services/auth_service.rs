// storefront/src/services/auth_service.rs

//! Password hashing, session tokens, and the admin login flow.

use crate::errors::AppError;
use crate::models::{Role, User};
use crate::store::Store;
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Hashes a plain-text password using Argon2.
///
/// # Returns
/// The PHC-formatted hash string, or an `AppError` if hashing fails or the
/// password is empty.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::validation("Password cannot be empty for hashing."));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch; malformed stored hashes are internal errors.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// The authenticated subject attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id: Uuid,
  pub email: String,
  pub role: Role,
}

impl Identity {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

impl From<&User> for Identity {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      email: user.email.clone(),
      role: user.role,
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
  id: Uuid,
  email: String,
  role: Role,
  iat: i64,
  exp: i64,
}

/// Issues and verifies HS256 session tokens signed with the server secret.
pub struct SessionTokens {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl SessionTokens {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl,
    }
  }

  pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX / 2);
    self.encode_claims(&SessionClaims {
      id: identity.id,
      email: identity.email.clone(),
      role: identity.role,
      iat: now,
      exp: now.saturating_add(ttl),
    })
  }

  fn encode_claims(&self, claims: &SessionClaims) -> Result<String, AppError> {
    encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
      .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
  }

  /// Any signature, format or expiry failure is reported uniformly.
  pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
    let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
      debug!(error = %e, "Session token rejected.");
      AppError::InvalidToken
    })?;
    Ok(Identity {
      id: data.claims.id,
      email: data.claims.email,
      role: data.claims.role,
    })
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
  pub token: String,
  pub user: Identity,
}

/// Checks credentials and issues a session token.
///
/// Unknown e-mail and wrong password both fail with the same
/// `AppError::Authentication`.
#[instrument(name = "auth_service::login", skip(store, sessions, password), fields(email = %email))]
pub async fn login(
  store: &dyn Store,
  sessions: &SessionTokens,
  email: &str,
  password: &str,
) -> Result<LoginOutcome, AppError> {
  let user = match store.find_user_by_email(email).await? {
    Some(user) => user,
    None => {
      warn!("Login attempt for unknown email.");
      return Err(AppError::Authentication);
    }
  };

  let stored_hash = user.password_hash.clone();
  let provided = password.to_string();
  let matches = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &provided))
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))??;

  if !matches {
    warn!(user_id = %user.id, "Password mismatch on login.");
    return Err(AppError::Authentication);
  }

  let identity = Identity::from(&user);
  let token = sessions.issue(&identity)?;
  info!(user_id = %user.id, role = ?user.role, "Login successful.");
  Ok(LoginOutcome { token, user: identity })
}

/// Creates or re-keys the ADMIN account used by the back office.
#[instrument(name = "auth_service::seed_admin", skip(store, password), fields(email = %email))]
pub async fn seed_admin(store: &dyn Store, email: &str, password: &str) -> Result<User, AppError> {
  let email = email.trim().to_lowercase();
  let password = password.to_string();
  let hash = tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;
  let user = store.upsert_admin(&email, &hash).await?;
  info!(user_id = %user.id, "Admin account provisioned.");
  Ok(user)
}
