//! Circuit breaker implementation

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};
use super::ArbError;

pub struct CircuitBreaker {
    pub consecutive_errors: Arc<RwLock<u32>>,
    pub is_open: Arc<RwLock<bool>>,
    pub last_error_time: Arc<RwLock<Option<Instant>>>,
    pub max_consecutive_errors: u32,
    pub cooldown_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_errors: u32, cooldown_secs: u64) -> Self {
        Self {
            consecutive_errors: Arc::new(RwLock::new(0)),
            is_open: Arc::new(RwLock::new(false)),
            last_error_time: Arc::new(RwLock::new(None)),
            max_consecutive_errors: max_consecutive_errors.max(1),
            cooldown_duration: Duration::from_secs(cooldown_secs),
        }
    }

    pub async fn record_success(&self) {
        *self.consecutive_errors.write().await = 0;
        *self.is_open.write().await = false;
    }

    /// Returns true when this error tripped the breaker.
    ///
    /// Never holds more than one of the breaker's locks at a time.
    pub async fn record_error(&self) -> bool {
        let errors = {
            let mut errors = self.consecutive_errors.write().await;
            *errors += 1;
            *errors
        };

        if errors >= self.max_consecutive_errors {
            *self.last_error_time.write().await = Some(Instant::now());
            *self.is_open.write().await = true;
            error!("Circuit breaker OPEN after {} consecutive errors", errors);
            return true;
        }
        false
    }

    pub async fn can_proceed(&self) -> bool {
        let is_open = *self.is_open.read().await;
        if !is_open {
            return true;
        }

        let last_error = *self.last_error_time.read().await;
        if let Some(last_error) = last_error {
            if last_error.elapsed() > self.cooldown_duration {
                info!("Circuit breaker cooldown complete, resetting");
                *self.is_open.write().await = false;
                *self.consecutive_errors.write().await = 0;
                return true;
            }
        }
        false
    }

    /// Fails with `CircuitBreakerOpen` while the breaker is open.
    pub async fn ensure_closed(&self) -> Result<(), ArbError> {
        if self.can_proceed().await {
            return Ok(());
        }
        let last_error = *self.last_error_time.read().await;
        let elapsed = last_error.map(|t| t.elapsed()).unwrap_or_default();
        let errors = *self.consecutive_errors.read().await;
        Err(ArbError::CircuitBreakerOpen {
            reason: format!("{errors} consecutive failures"),
            cooldown_remaining: self.cooldown_duration.saturating_sub(elapsed),
        })
    }
}
