//! Earth Engine outbound adapter.
//!
//! Implements the vegetation map, vegetation series and session ports
//! against the Earth Engine REST API.

mod auth;
mod dto;
mod expression;
mod http_engine;


pub use auth::{
    CredentialsError, DEFAULT_TOKEN_URI, EARTH_ENGINE_SCOPE, EarthEngineCredentials,
    ServiceAccountKey,
};
pub use http_engine::{
    DEFAULT_API_BASE, DEFAULT_COLLECTION, EarthEngineConfig, EarthEngineHttpClient,
};
