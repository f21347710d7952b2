//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AGRISCOPE_*` environment variables and the
//! optional configuration file, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_LATENCY_DAYS, RetryPolicy};
use crate::outbound::earth_engine::{
    CredentialsError, EarthEngineConfig, EarthEngineCredentials, ServiceAccountKey,
};
use crate::outbound::gemini::GeminiConfig;
use crate::outbound::nasa_power::NasaPowerConfig;

const DEFAULT_PROJECT: &str = "agriscope21";
const DEFAULT_PORT: u16 = 5000;

/// Errors raised while turning settings into adapter configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A base URL setting did not parse.
    #[error("invalid URL in {setting}: {source}")]
    InvalidUrl {
        /// Setting name.
        setting: &'static str,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Neither a key file nor an access token was configured.
    #[error(
        "no Earth Engine credentials configured; set AGRISCOPE_EE_SERVICE_ACCOUNT_KEY \
         or AGRISCOPE_EE_ACCESS_TOKEN"
    )]
    MissingCredentials,
    /// The key file could not be loaded.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

fn parse_base_url(setting: &'static str, raw: &str) -> Result<Url, SettingsError> {
    // Relative joins drop the last path segment unless the base ends in `/`.
    let normalised = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalised).map_err(|source| SettingsError::InvalidUrl { setting, source })
}

/// Server and upstream configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AGRISCOPE")]
pub struct AppSettings {
    /// Address to bind the HTTP listener to.
    pub host: Option<IpAddr>,
    /// Port to bind the HTTP listener to.
    pub port: Option<u16>,
    /// Earth Engine cloud project.
    pub ee_project: Option<String>,
    /// Earth Engine REST base URL.
    pub ee_api_base: Option<String>,
    /// Image collection queried for scenes.
    pub ee_collection: Option<String>,
    /// Maximum scene cloud cover in percent.
    pub cloud_threshold: Option<f64>,
    /// Path to a service-account JSON key.
    pub ee_service_account_key: Option<PathBuf>,
    /// Static OAuth access token, used when no key file is set.
    pub ee_access_token: Option<String>,
    /// Days of processing latency before imagery becomes available.
    pub latency_days: Option<u32>,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Authentication attempts made at startup.
    pub bootstrap_attempts: Option<u32>,
    /// Seconds to wait between startup authentication attempts.
    pub bootstrap_wait_secs: Option<u64>,
    /// Gemini API key; crop recommendations fall back when absent.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: Option<String>,
    /// Gemini API base URL.
    pub gemini_base_url: Option<String>,
    /// NASA POWER daily point endpoint.
    pub weather_api_url: Option<String>,
    /// Comma-separated browser origins allowed to call the API; any origin
    /// when unset.
    pub cors_allowed_origins: Option<String>,
}

impl AppSettings {
    /// Socket address for the HTTP listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Earth Engine project, falling back to the default.
    pub fn ee_project(&self) -> &str {
        self.ee_project.as_deref().unwrap_or(DEFAULT_PROJECT)
    }

    /// Archive latency in days.
    pub fn latency_days(&self) -> u32 {
        self.latency_days.unwrap_or(DEFAULT_LATENCY_DAYS)
    }

    /// Upstream request timeout, when overridden.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Earth Engine adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the API base is malformed.
    pub fn earth_engine(&self) -> Result<EarthEngineConfig, SettingsError> {
        let mut config = EarthEngineConfig::for_project(self.ee_project()).map_err(|source| {
            SettingsError::InvalidUrl {
                setting: "ee_api_base",
                source,
            }
        })?;
        if let Some(base) = self.ee_api_base.as_deref() {
            config.api_base = parse_base_url("ee_api_base", base)?;
        }
        if let Some(collection) = &self.ee_collection {
            config.collection.clone_from(collection);
        }
        if let Some(threshold) = self.cloud_threshold {
            config.cloud_threshold = threshold;
        }
        if let Some(timeout) = self.request_timeout() {
            config.request_timeout = timeout;
        }
        Ok(config)
    }

    /// Earth Engine credentials; a key file wins over an access token.
    ///
    /// # Errors
    ///
    /// Returns an error when the key file cannot be loaded or nothing is
    /// configured.
    pub fn earth_engine_credentials(&self) -> Result<EarthEngineCredentials, SettingsError> {
        if let Some(path) = &self.ee_service_account_key {
            return Ok(EarthEngineCredentials::ServiceAccount(
                ServiceAccountKey::from_file(path)?,
            ));
        }
        self.ee_access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| EarthEngineCredentials::AccessToken(Zeroizing::new(token.to_owned())))
            .ok_or(SettingsError::MissingCredentials)
    }

    /// Gemini adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the base URL is malformed.
    pub fn gemini(&self) -> Result<GeminiConfig, SettingsError> {
        let mut config = GeminiConfig::public().map_err(|source| SettingsError::InvalidUrl {
            setting: "gemini_base_url",
            source,
        })?;
        if let Some(base) = self.gemini_base_url.as_deref() {
            config.base_url = parse_base_url("gemini_base_url", base)?;
        }
        if let Some(model) = &self.gemini_model {
            config.model.clone_from(model);
        }
        if let Some(timeout) = self.request_timeout() {
            config.request_timeout = timeout;
        }
        Ok(config)
    }

    /// NASA POWER adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the endpoint is malformed.
    pub fn nasa_power(&self) -> Result<NasaPowerConfig, SettingsError> {
        let invalid = |source| SettingsError::InvalidUrl {
            setting: "weather_api_url",
            source,
        };
        let mut config = NasaPowerConfig::public().map_err(invalid)?;
        if let Some(endpoint) = self.weather_api_url.as_deref() {
            config.endpoint = Url::parse(endpoint).map_err(invalid)?;
        }
        if let Some(timeout) = self.request_timeout() {
            config.request_timeout = timeout;
        }
        Ok(config)
    }

    /// Origins allowed by the CORS policy. Empty means any origin.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Gemini API key, when configured and non-blank.
    pub fn gemini_api_key(&self) -> Option<Zeroizing<String>> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()))
    }

    /// Startup authentication retry policy.
    pub fn bootstrap_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.bootstrap_attempts.unwrap_or(defaults.max_attempts),
            wait: self
                .bootstrap_wait_secs
                .map_or(defaults.wait, Duration::from_secs),
        }
    }
}
