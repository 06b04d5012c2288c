//! Pretty-URL rewriting for single-page applications served from a CDN edge.
//!
//! The edge runtime calls [`event::handle_event`] once per viewer request.
//! Client-side routes are pointed at an `index.html` fallback; API calls and
//! static assets are passed through unchanged. The binary in this crate is a
//! local host for the same function (stdin/stdout or HTTP).

pub mod event;
mod http_util;
pub mod invoke_server;
pub mod rewrite_app;
pub mod rewrite_config;
pub mod rewriter;

pub use event::{handle_event, EdgeEvent, EdgeRequest};
pub use rewriter::{classify, fallback_path, PathKind, Rewrite, RewriteConfiguration, Rewriter};

