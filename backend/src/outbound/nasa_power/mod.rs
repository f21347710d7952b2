//! NASA POWER outbound adapter implementing the weather source port.

mod http_source;

pub use http_source::{
    DEFAULT_NASA_POWER_URL, NasaPowerConfig, NasaPowerHttpSource, NasaPowerSetupError,
};
