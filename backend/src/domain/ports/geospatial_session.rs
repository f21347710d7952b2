//! Driven port for establishing an authenticated engine session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::GeospatialEngineError;

/// Details of an established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Cloud project the session is bound to.
    pub project: String,
    /// When the current credential expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Port for authenticating against the geospatial engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeospatialSession: Send + Sync {
    /// Obtain credentials and confirm the project is reachable.
    async fn authenticate(&self) -> Result<SessionInfo, GeospatialEngineError>;
}

/// Fixture implementation that always succeeds.
#[derive(Debug, Clone, Default)]
pub struct FixtureGeospatialSession;

#[async_trait]
impl GeospatialSession for FixtureGeospatialSession {
    async fn authenticate(&self) -> Result<SessionInfo, GeospatialEngineError> {
        Ok(SessionInfo {
            project: "fixture-project".to_owned(),
            expires_at: None,
        })
    }
}
