//! OAuth credentials for the Earth Engine REST API.
//!
//! Service-account keys are exchanged for bearer tokens with a signed JWT
//! assertion; tokens are cached until shortly before they expire.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use mockable::Clock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

use super::http_engine::{map_status_error, map_transport_error};
use crate::domain::ports::GeospatialEngineError;

/// OAuth scope granting Earth Engine access.
pub const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";
/// Google's OAuth token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Errors raised while loading credentials at startup.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// The key file could not be read.
    #[error("failed to read service account key {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file is not a service account key.
    #[error("invalid service account key {path}: {source}")]
    Parse {
        /// Path that was read.
        path: String,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct ServiceAccountKeyFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
}

/// Service account identity used to sign token requests.
pub struct ServiceAccountKey {
    /// Service account e-mail; the JWT issuer.
    pub client_email: String,
    /// Key identifier placed in the JWT header.
    pub private_key_id: Option<String>,
    /// OAuth token endpoint.
    pub token_uri: String,
    /// Project the key belongs to.
    pub project_id: Option<String>,
    private_key: Zeroizing<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse a JSON key as downloaded from the cloud console.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: ServiceAccountKeyFile = serde_json::from_str(raw)?;
        Ok(Self {
            client_email: file.client_email,
            private_key_id: file.private_key_id,
            token_uri: file.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_owned()),
            project_id: file.project_id,
            private_key: Zeroizing::new(file.private_key),
        })
    }

    /// Read and parse a JSON key file.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let display = path.display().to_string();
        let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            CredentialsError::Read {
                path: display.clone(),
                source,
            }
        })?);
        Self::from_json(&raw).map_err(|source| CredentialsError::Parse {
            path: display,
            source,
        })
    }

    /// Raw PEM, used for fingerprinting.
    pub fn private_key_pem(&self) -> &str {
        &self.private_key
    }
}

/// How the adapter authenticates.
#[derive(Debug)]
pub enum EarthEngineCredentials {
    /// Exchange signed assertions for short-lived tokens.
    ServiceAccount(ServiceAccountKey),
    /// Use a pre-issued bearer token as is.
    AccessToken(Zeroizing<String>),
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

/// Issues bearer tokens, caching them until close to expiry.
pub struct TokenProvider {
    client: Client,
    credentials: EarthEngineCredentials,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider sharing the adapter's HTTP client.
    pub fn new(client: Client, credentials: EarthEngineCredentials, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            credentials,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token and its expiry, if known.
    pub async fn bearer(
        &self,
    ) -> Result<(Zeroizing<String>, Option<DateTime<Utc>>), GeospatialEngineError> {
        let key = match &self.credentials {
            EarthEngineCredentials::AccessToken(token) => return Ok((token.clone(), None)),
            EarthEngineCredentials::ServiceAccount(key) => key,
        };

        let now = self.clock.utc();
        let mut cached = self.cached.lock().await;
        let refresh_after = now + TimeDelta::seconds(REFRESH_MARGIN_SECS);
        if let Some(token) = cached.as_ref().filter(|token| token.expires_at > refresh_after) {
            return Ok((token.token.clone(), Some(token.expires_at)));
        }

        let fresh = self.exchange(key, now).await?;
        let result = (fresh.token.clone(), Some(fresh.expires_at));
        *cached = Some(fresh);
        Ok(result)
    }

    /// Drop any cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn exchange(
        &self,
        key: &ServiceAccountKey,
        now: DateTime<Utc>,
    ) -> Result<CachedToken, GeospatialEngineError> {
        let assertion = sign_assertion(key, now)?;
        let response = self
            .client
            .post(key.token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            // The token endpoint reports bad keys as 400 invalid_grant.
            return Err(match map_status_error(status, body.as_ref()) {
                GeospatialEngineError::Rejected { message } => {
                    GeospatialEngineError::unauthenticated(message)
                }
                other => other,
            });
        }

        let decoded: TokenResponse = serde_json::from_slice(body.as_ref()).map_err(|error| {
            GeospatialEngineError::decode(format!("invalid token response: {error}"))
        })?;
        let lifetime = decoded
            .expires_in
            .map(TimeDelta::seconds)
            .unwrap_or(TimeDelta::seconds(ASSERTION_LIFETIME_SECS));
        debug!(
            issuer = %key.client_email,
            lifetime_secs = lifetime.num_seconds(),
            "issued Earth Engine token"
        );
        Ok(CachedToken {
            token: Zeroizing::new(decoded.access_token),
            expires_at: now + lifetime,
        })
    }
}

fn assertion_claims(key: &ServiceAccountKey, now: DateTime<Utc>) -> AssertionClaims<'_> {
    AssertionClaims {
        iss: &key.client_email,
        scope: EARTH_ENGINE_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + TimeDelta::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    }
}

fn sign_assertion(
    key: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<Zeroizing<String>, GeospatialEngineError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|error| {
        GeospatialEngineError::unauthenticated(format!("unusable service account key: {error}"))
    })?;
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    jsonwebtoken::encode(&header, &assertion_claims(key, now), &encoding_key)
        .map(Zeroizing::new)
        .map_err(|error| {
            GeospatialEngineError::unauthenticated(format!("failed to sign assertion: {error}"))
        })
}
