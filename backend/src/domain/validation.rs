//! Shared builders for field-level validation errors.
//!
//! Every validation failure is an [`Error::invalid_request`] whose details
//! name the offending field and a stable machine-readable reason.

use serde_json::json;

use super::Error;

/// Stable reason codes carried in validation error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// A required field was absent.
    MissingField,
    /// Too few polygon vertices.
    TooFewVertices,
    /// A vertex was not a `[lng, lat]` pair of finite numbers.
    InvalidVertex,
    /// A vertex lies outside WGS84 bounds.
    OutOfRange,
    /// A date was not `YYYY-MM-DD`.
    InvalidDate,
    /// The start date falls after the end date.
    InvalidRange,
    /// The window starts inside the data latency period.
    TooRecent,
    /// The index name is not supported.
    UnknownIndex,
}

impl ValidationCode {
    /// Wire representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::TooFewVertices => "too_few_vertices",
            Self::InvalidVertex => "invalid_vertex",
            Self::OutOfRange => "out_of_range",
            Self::InvalidDate => "invalid_date",
            Self::InvalidRange => "invalid_range",
            Self::TooRecent => "too_recent",
            Self::UnknownIndex => "unknown_index",
        }
    }
}

/// Build an invalid-request error for `field`.
pub(crate) fn field_error(field: &str, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Build an invalid-request error that also echoes the rejected value.
pub(crate) fn field_value_error(
    field: &str,
    code: ValidationCode,
    value: &str,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

/// Build an invalid-request error for one element of a list field.
pub(crate) fn field_index_error(
    field: &str,
    code: ValidationCode,
    index: usize,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "index": index,
        "code": code.as_str(),
    }))
}

/// Error for a required request field that was not supplied.
pub fn missing_field_error(field: &str) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {field}"),
    )
}
