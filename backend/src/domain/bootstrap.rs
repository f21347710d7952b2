//! Startup authentication against the geospatial engine.
//!
//! The engine occasionally refuses the first handshake after a cold start,
//! so startup retries a bounded number of times before giving up.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{GeospatialEngineError, GeospatialSession, SessionInfo};

/// Async sleeping abstraction so retry tests run instantly.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded, fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least one is always made.
    pub max_attempts: u32,
    /// Pause after each failed attempt.
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait: Duration::from_secs(5),
        }
    }
}

/// Authenticate, retrying every failure until the policy is exhausted.
///
/// Every failed attempt is followed by one `wait`, the last one included, so
/// a fully failed startup takes `max_attempts * wait` before it reports.
/// Returns the last error when no attempt succeeds.
pub async fn authenticate_with_retry(
    session: &dyn GeospatialSession,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<SessionInfo, GeospatialEngineError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match session.authenticate().await {
            Ok(info) => {
                info!(attempt, project = %info.project, "geospatial engine session established");
                return Ok(info);
            }
            Err(error) => {
                warn!(attempt, max_attempts = attempts, error = %error, "geospatial engine authentication failed");
                sleeper.sleep(policy.wait).await;
                if attempt >= attempts {
                    warn!(attempts, "geospatial engine authentication attempts exhausted");
                    return Err(error);
                }
                attempt += 1;
            }
        }
    }
}
