//! Path patterns and upstream path joining.
//!
//! # Responsibilities
//! - Classify a configured path as exact or prefix
//! - Produce the router patterns a route registers under
//! - Extract the suffix a prefix route forwards upstream
//! - Join that suffix onto the upstream's own path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A trailing `/` is the only thing that makes a route a prefix route
//! - The suffix is taken from the raw (still percent-encoded) request path

/// Name of the wildcard capture used for prefix routes.
pub const SUFFIX_PARAM: &str = "suffix";

/// How a route matches inbound paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches the path exactly; nothing is forwarded beyond the upstream path.
    Exact(String),
    /// Matches the prefix and everything beneath it. Stored with its trailing `/`.
    Prefix(String),
}

impl PathPattern {
    /// Classify a configured path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.ends_with('/') {
            PathPattern::Prefix(path)
        } else {
            PathPattern::Exact(path)
        }
    }

    /// The path as configured.
    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Exact(p) | PathPattern::Prefix(p) => p,
        }
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, PathPattern::Prefix(_))
    }

    /// Router patterns this route must be registered under.
    ///
    /// A prefix route needs its bare prefix as well, since a wildcard
    /// capture never matches an empty suffix.
    pub fn router_paths(&self) -> Vec<String> {
        match self {
            PathPattern::Exact(p) => vec![p.clone()],
            PathPattern::Prefix(p) => vec![p.clone(), format!("{p}{{*{SUFFIX_PARAM}}}")],
        }
    }

    /// The slash-less form of a prefix route (`/api` for `/api/`), which
    /// redirects to the prefix itself. `None` for exact routes and for `/`.
    pub fn redirect_from(&self) -> Option<&str> {
        match self {
            PathPattern::Exact(_) => None,
            PathPattern::Prefix(p) => {
                let bare = p.trim_end_matches('/');
                (!bare.is_empty()).then_some(bare)
            }
        }
    }

    /// The part of `request_path` forwarded to the upstream.
    ///
    /// `None` for exact routes. For prefix routes the suffix keeps its leading
    /// `/` (`/api/` + `/api/widgets/7` gives `/widgets/7`) and may be `/`.
    pub fn suffix<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        match self {
            PathPattern::Exact(_) => None,
            PathPattern::Prefix(p) => {
                let base = p.trim_end_matches('/');
                Some(request_path.strip_prefix(base).unwrap_or(""))
            }
        }
    }
}

/// Join `suffix` onto `base` with clean-path semantics.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment, and
/// the result never ends in `/` unless it is the root.
pub fn join_path(base: &str, suffix: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(suffix.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
