//! Route descriptors.
//!
//! # Responsibilities
//! - Validate one [`RouteConfig`] into an immutable [`Route`]
//! - Pre-compile the request/response query programs
//! - Resolve the destination URL for an inbound path
//!
//! # Design Decisions
//! - Every optional config field is resolved here, once; request handling
//!   only ever sees a fully built descriptor
//! - Header overrides are parsed into `HeaderValue`s up front so a bad
//!   value fails startup instead of a request

use axum::http::HeaderValue;
use url::Url;

use crate::config::RouteConfig;
use crate::query::{QueryError, QueryProgram};
use crate::routing::matcher::{join_path, PathPattern};

/// Why a route could not be built.
#[derive(Debug, thiserror::Error)]
pub enum RouteBuildError {
    #[error("request: {0}")]
    Request(#[source] QueryError),

    #[error("response: {0}")]
    Response(#[source] QueryError),

    #[error("upstream is missing")]
    UpstreamMissing,

    #[error("upstream: {0}")]
    InvalidUpstream(#[from] url::ParseError),

    #[error("upstream scheme {0:?} is not http or https")]
    UnsupportedScheme(String),

    #[error("path is missing")]
    PathMissing,

    #[error("path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("set.{side}.contenttype {value:?} is not a valid header value")]
    InvalidContentType { side: &'static str, value: String },

    #[error("duplicate route path {0:?}")]
    DuplicatePath(String),
}

/// A validated, immutable route.
#[derive(Debug)]
pub struct Route {
    pattern: PathPattern,
    upstream: Url,
    request_program: Option<QueryProgram>,
    response_program: Option<QueryProgram>,
    request_content_type: Option<HeaderValue>,
    response_content_type: Option<HeaderValue>,
}

impl Route {
    /// Build a route from its configuration, compiling any query programs.
    pub fn build(config: &RouteConfig) -> Result<Self, RouteBuildError> {
        let request_program = config
            .request
            .as_deref()
            .map(QueryProgram::compile)
            .transpose()
            .map_err(RouteBuildError::Request)?;
        let response_program = config
            .response
            .as_deref()
            .map(QueryProgram::compile)
            .transpose()
            .map_err(RouteBuildError::Response)?;

        let upstream = config
            .upstream
            .as_deref()
            .ok_or(RouteBuildError::UpstreamMissing)?;
        let upstream = Url::parse(upstream)?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(RouteBuildError::UnsupportedScheme(
                upstream.scheme().to_string(),
            ));
        }

        let path = config
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(RouteBuildError::PathMissing)?;
        validate_path(path)?;

        Ok(Self {
            pattern: PathPattern::new(path),
            upstream,
            request_program,
            response_program,
            request_content_type: content_type("request", &config.set.request.contenttype)?,
            response_content_type: content_type("response", &config.set.response.contenttype)?,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The configured path, used to label logs and metrics.
    pub fn name(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    pub fn request_program(&self) -> Option<&QueryProgram> {
        self.request_program.as_ref()
    }

    pub fn response_program(&self) -> Option<&QueryProgram> {
        self.response_program.as_ref()
    }

    pub fn request_content_type(&self) -> Option<&HeaderValue> {
        self.request_content_type.as_ref()
    }

    pub fn response_content_type(&self) -> Option<&HeaderValue> {
        self.response_content_type.as_ref()
    }

    /// Upstream URL for an inbound request path.
    ///
    /// Prefix routes append their captured suffix to the upstream path; exact
    /// routes always go to the upstream URL as configured.
    pub fn destination(&self, request_path: &str) -> Url {
        let mut url = self.upstream.clone();
        if let Some(suffix) = self.pattern.suffix(request_path) {
            let joined = join_path(url.path(), suffix);
            url.set_path(&joined);
        }
        url
    }
}

fn validate_path(path: &str) -> Result<(), RouteBuildError> {
    let invalid = |reason| RouteBuildError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if path.contains(['{', '}']) {
        return Err(invalid("must not contain '{' or '}'"));
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(invalid("segments must not start with ':' or '*'"));
    }
    Ok(())
}

fn content_type(
    side: &'static str,
    value: &Option<String>,
) -> Result<Option<HeaderValue>, RouteBuildError> {
    value
        .as_deref()
        .map(|v| {
            HeaderValue::from_str(v).map_err(|_| RouteBuildError::InvalidContentType {
                side,
                value: v.to_string(),
            })
        })
        .transpose()
}
