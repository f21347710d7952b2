//! Per-request correlation identifier.
//!
//! The identifier lives in Tokio task-local storage so services and error
//! constructors can read it without threading it through every call. Task
//! locals are not inherited by spawned tasks; wrap spawned work in
//! [`TraceId::scope`] to carry it along.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header echoing the identifier to clients. Also accepted on requests.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// UUID correlating log events and error payloads for one request.
///
/// # Examples
/// ```
/// use agriscope_backend::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "calculating index");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller-supplied identifier when it is a non-nil UUID,
    /// otherwise mint a new one.
    ///
    /// ```
    /// use agriscope_backend::TraceId;
    ///
    /// let supplied = "6f1c1f1e-8f0a-4c53-9d0e-2b8f5b7c9a10";
    /// assert_eq!(TraceId::inherit_or_generate(Some(supplied)).to_string(), supplied);
    /// assert_ne!(TraceId::inherit_or_generate(Some("field-7")).to_string(), "field-7");
    /// ```
    #[must_use]
    pub fn inherit_or_generate(supplied: Option<&str>) -> Self {
        supplied
            .and_then(|raw| raw.trim().parse::<Self>().ok())
            .filter(|id| !id.0.is_nil())
            .unwrap_or_else(Self::generate)
    }

    /// The identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    ///
    /// ```
    /// use agriscope_backend::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let trace_id = TraceId::inherit_or_generate(None);
    /// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
