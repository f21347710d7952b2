//! Gemini outbound adapter implementing the crop advisor model port.

mod dto;
mod http_model;

pub use http_model::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiHttpModel, GeminiSetupError,
};
