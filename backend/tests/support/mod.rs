//! Shared helpers for the integration suites.

pub(crate) mod app;
pub(crate) mod doubles;
pub(crate) mod harness;
