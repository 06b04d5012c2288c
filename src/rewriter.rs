//! The pretty-URL rewrite applied to every inbound edge request.
//!
//! Paths that look like client-side routes (no file extension) are pointed at
//! an `index.html` fallback so the single-page application's router can take
//! over. API calls and static assets pass through untouched.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::event::EdgeRequest;

/// Paths under this prefix always belong to the backend API.
pub const API_PREFIX: &str = "/api/";

/// The document served in place of a client-side route.
pub const FALLBACK_DOCUMENT: &str = "index.html";

// Same semantics as the edge platform's JavaScript regex: `.` stops at any line
// terminator and `\w` is ASCII-only.
static FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[^\n\r\x{2028}\x{2029}]+\.(?-u:\w)+$").expect("file pattern is a valid regex")
});

/// How a request path is treated by the rewriter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Starts with [`API_PREFIX`].
    Api,
    /// Ends in a dot-delimited extension, e.g. `/assets/app.js`.
    File,
    /// Anything else: `/`, `/about`, `/users/42`.
    Route,
}

/// The decision made for a single path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    Api,
    File,
    Route { fallback: String },
}

impl Rewrite {
    /// The new path, if the request should be rewritten.
    pub fn fallback(&self) -> Option<&str> {
        match self {
            Self::Route { fallback } => Some(fallback.as_str()),
            Self::Api | Self::File => None,
        }
    }
}

/// Configuration injected into a [`Rewriter`]. Fixed for the rewriter's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteConfiguration {
    /// How many leading path segments are kept in front of the fallback document.
    pub level: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Rewriter {
    config: RewriteConfiguration,
}

impl Rewriter {
    pub fn new(config: RewriteConfiguration) -> Self {
        Self { config }
    }

    pub fn level(&self) -> usize {
        self.config.level
    }

    /// Decide what to do with `uri` without touching any request.
    pub fn rewrite(&self, uri: &str) -> Rewrite {
        match classify(uri) {
            PathKind::Api => Rewrite::Api,
            PathKind::File => Rewrite::File,
            PathKind::Route => Rewrite::Route {
                fallback: fallback_path(uri, self.config.level),
            },
        }
    }

    /// Rewrite the request's `uri` in place if it is a route.
    ///
    /// Only `uri` is ever changed. A diagnostic line is logged for every
    /// rewritten route and for nothing else.
    pub fn handle(&self, mut request: EdgeRequest) -> EdgeRequest {
        if let Rewrite::Route { fallback } = self.rewrite(&request.uri) {
            info!(
                original = %request.uri,
                rewritten = %fallback,
                "Request for [{}], rewritten to [{}]",
                request.uri,
                fallback
            );
            request.uri = fallback;
        }
        request
    }
}

/// Classify a request path. The API prefix wins over the file pattern.
pub fn classify(uri: &str) -> PathKind {
    if uri.starts_with(API_PREFIX) {
        PathKind::Api
    } else if FILE_PATTERN.is_match(uri) {
        PathKind::File
    } else {
        PathKind::Route
    }
}

/// Build the fallback path for a route, keeping at most `level` leading segments.
///
/// One leading and one trailing `/` are stripped before splitting. Empty
/// segments are kept, so `/` at level 1 becomes `//index.html`.
pub fn fallback_path(uri: &str, level: usize) -> String {
    let trimmed = uri.strip_prefix('/').unwrap_or(uri);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let mut path: String = trimmed
        .split('/')
        .take(level)
        .flat_map(|segment| ["/", segment])
        .collect();
    path.push('/');
    path.push_str(FALLBACK_DOCUMENT);
    path
}
