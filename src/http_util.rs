//! Utilities for working with HTTP requests and responses.

use hyper::{header::CONTENT_TYPE, Body, Response, StatusCode};
use serde::Serialize;

/// Create an HTTP 404 response
pub(crate) fn not_found() -> Response<Body> {
    let mut not_found = Response::default();
    *not_found.status_mut() = StatusCode::NOT_FOUND;
    not_found
}

/// Create an HTTP 400 response
pub(crate) fn bad_request(msg: impl std::string::ToString) -> Response<Body> {
    let message = msg.to_string();
    tracing::warn!(%message, "HTTP 400 error");
    let mut res = Response::new(Body::from(message));
    *res.status_mut() = StatusCode::BAD_REQUEST;
    res
}

/// Create an HTTP 500 response
pub(crate) fn internal_error(msg: impl std::string::ToString) -> Response<Body> {
    let message = msg.to_string();
    tracing::error!(%message, "HTTP 500 error");
    let mut res = Response::new(Body::from(message));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}

/// Create an HTTP 200 response with a JSON body
pub(crate) fn json_response(value: &impl Serialize) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut res = Response::new(Body::from(body));
            res.headers_mut().insert(
                CONTENT_TYPE,
                hyper::header::HeaderValue::from_static("application/json"),
            );
            res
        }
        Err(e) => internal_error(format!("Couldn't serialize response: {}", e)),
    }
}
