//! Per-request errors.
//!
//! Everything that can go wrong while serving one exchange. Each variant is
//! reported to the caller as a `400` JSON envelope (see
//! [`crate::http::response`]); none of them affect other requests.

/// Which body a transform ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Request,
    Response,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Request => "request",
            Side::Response => "response",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a configured transform on a body that did parse as JSON.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The program produced no output for this body.
    #[error("no result")]
    NoResult,

    /// The program raised an error.
    #[error("{0}")]
    Runtime(String),

    /// The program's output could not be encoded as JSON.
    #[error("jq serialize: {0}")]
    Serialize(String),
}

/// Error type for a single proxied exchange.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("request read: {0}")]
    RequestRead(String),

    #[error("jq run failed")]
    RequestNoResult,

    #[error("jq run failed: {0}")]
    RequestRuntime(String),

    #[error("jq response run failed")]
    ResponseNoResult,

    #[error("jq response run failed: {0}")]
    ResponseRuntime(String),

    #[error("jq serialize: {0}")]
    Serialize(String),

    #[error("proxy build: {0}")]
    Build(#[source] reqwest::Error),

    #[error("proxy request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("proxy response read: {0}")]
    ResponseRead(String),
}

impl ProxyError {
    /// Classify a transform failure by the side it happened on.
    pub fn transform(side: Side, err: TransformError) -> Self {
        match (side, err) {
            (_, TransformError::Serialize(msg)) => ProxyError::Serialize(msg),
            (Side::Request, TransformError::NoResult) => ProxyError::RequestNoResult,
            (Side::Request, TransformError::Runtime(msg)) => ProxyError::RequestRuntime(msg),
            (Side::Response, TransformError::NoResult) => ProxyError::ResponseNoResult,
            (Side::Response, TransformError::Runtime(msg)) => ProxyError::ResponseRuntime(msg),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::RequestRead(_) | ProxyError::ResponseRead(_) => "body_read",
            ProxyError::RequestNoResult | ProxyError::ResponseNoResult => "no_result",
            ProxyError::RequestRuntime(_) | ProxyError::ResponseRuntime(_) => "runtime",
            ProxyError::Serialize(_) => "serialize",
            ProxyError::Build(_) => "build",
            ProxyError::Upstream(_) => "upstream",
        }
    }
}
