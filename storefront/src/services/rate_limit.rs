// storefront/src/services/rate_limit.rs

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::errors::AppError;

/// Keys are pruned once the map grows past this many entries.
const PRUNE_THRESHOLD: usize = 4096;

/// Sliding-window attempt counter keyed by client address.
///
/// Every attempt inside the window counts, successful or not. A rejected
/// attempt is not recorded, so the window drains on schedule.
pub struct LoginRateLimiter {
  max_attempts: usize,
  window: Duration,
  attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl LoginRateLimiter {
  pub fn new(max_attempts: usize, window: Duration) -> Self {
    Self {
      max_attempts,
      window,
      attempts: Mutex::new(HashMap::new()),
    }
  }

  pub fn check(&self, key: &str) -> Result<(), AppError> {
    self.check_at(key, Instant::now())
  }

  pub(crate) fn check_at(&self, key: &str, now: Instant) -> Result<(), AppError> {
    let mut attempts = self.attempts.lock();

    if attempts.len() > PRUNE_THRESHOLD {
      let window = self.window;
      attempts.retain(|_, seen| seen.back().is_some_and(|last| now.duration_since(*last) < window));
    }

    let seen = attempts.entry(key.to_string()).or_default();
    while let Some(oldest) = seen.front() {
      if now.duration_since(*oldest) >= self.window {
        seen.pop_front();
      } else {
        break;
      }
    }

    if seen.len() >= self.max_attempts {
      warn!(client = %key, attempts = seen.len(), "Login rate limit exceeded.");
      return Err(AppError::RateLimited);
    }
    seen.push_back(now);
    Ok(())
  }
}
