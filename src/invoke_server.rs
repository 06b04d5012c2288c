use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server};
use serde::Serialize;
use tracing::instrument;

use crate::event::{handle_event, parse_event};
use crate::http_util::{bad_request, json_response, not_found};
use crate::rewrite_config::HttpConfiguration;
use crate::rewriter::Rewriter;

const REWRITE_PREFIX: &str = "/rewrite";

/// Serves edge invocations over HTTP so the rewriter can be exercised locally.
pub struct InvokeServer {
    rewriter: Arc<Rewriter>,
    address: SocketAddr,
}

/// Body of a `GET /rewrite/<path>` answer.
#[derive(Debug, Serialize)]
struct RewritePreview<'a> {
    uri: &'a str,
    rewritten: Option<&'a str>,
}

impl InvokeServer {
    pub fn new(configuration: &HttpConfiguration, rewriter: Rewriter) -> Self {
        Self {
            rewriter: Arc::new(rewriter),
            address: configuration.listen_on,
        }
    }

    pub async fn serve(&self) -> anyhow::Result<()> {
        let mk_svc = make_service_fn(move |_conn| {
            let r = self.rewriter.clone();
            async move {
                Ok::<_, std::convert::Infallible>(service_fn(move |req| {
                    let r2 = r.clone();
                    async move { route(&r2, req).await }
                }))
            }
        });

        tracing::info!(address = %self.address, level = self.rewriter.level(), "Starting server");
        Server::bind(&self.address).serve(mk_svc).await?;

        Ok(())
    }
}

/// Route a host request to the right endpoint.
///
/// `/healthz` is built in, `POST /invoke` runs one edge invocation and
/// `GET /rewrite/<path>` previews the decision for a single path. The path is
/// passed on still percent-encoded, the same form the edge runtime delivers.
#[instrument(level = "info", skip(rewriter, req), fields(uri = %req.uri()))]
pub async fn route(rewriter: &Rewriter, req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    tracing::trace!("Processing request");

    match (req.method(), req.uri().path()) {
        (&Method::GET, "/healthz") => Ok(Response::new(Body::from("OK"))),
        (&Method::POST, "/invoke") => {
            let body = hyper::body::to_bytes(req.into_body()).await?;
            match parse_event(&body) {
                Ok(event) => Ok(json_response(&handle_event(rewriter, event))),
                Err(e) => Ok(bad_request(format!("{:#}", e))),
            }
        }
        (&Method::GET, path) => match path.strip_prefix(REWRITE_PREFIX) {
            Some(uri) if uri.starts_with('/') => {
                let rewrite = rewriter.rewrite(uri);
                Ok(json_response(&RewritePreview {
                    uri,
                    rewritten: rewrite.fallback(),
                }))
            }
            _ => Ok(not_found()),
        },
        _ => Ok(not_found()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rewriter::RewriteConfiguration;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    async fn body_json(res: Response<Body>) -> Value {
        let bytes = hyper::body::to_bytes(res.into_body())
            .await
            .expect("body read");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).expect("request built")
    }

    fn post(path: &str, body: &'static str) -> Request<Body> {
        Request::post(path).body(Body::from(body)).expect("request built")
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let res = route(&Rewriter::default(), get("/healthz")).await.expect("routed");
        assert_eq!(StatusCode::OK, res.status());
        let bytes = hyper::body::to_bytes(res.into_body()).await.expect("body read");
        assert_eq!(&b"OK"[..], &bytes[..]);
    }

    #[tokio::test]
    async fn invoke_rewrites_route() {
        let res = route(
            &Rewriter::default(),
            post("/invoke", r#"{"request": {"uri": "/about", "method": "GET"}}"#),
        )
        .await
        .expect("routed");
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(
            Some("application/json"),
            res.headers().get("content-type").and_then(|v| v.to_str().ok())
        );
        assert_eq!(json!({"uri": "/index.html", "method": "GET"}), body_json(res).await);
    }

    #[tokio::test]
    async fn invoke_with_bad_body_is_bad_request() {
        let res = route(&Rewriter::default(), post("/invoke", r#"{"request": {}}"#))
            .await
            .expect("routed");
        assert_eq!(StatusCode::BAD_REQUEST, res.status());
    }

    #[tokio::test]
    async fn rewrite_preview_reports_decision() {
        let rewriter = Rewriter::new(RewriteConfiguration { level: 1 });

        let res = route(&rewriter, get("/rewrite/docs/intro")).await.expect("routed");
        assert_eq!(
            json!({"uri": "/docs/intro", "rewritten": "/docs/index.html"}),
            body_json(res).await
        );

        let res = route(&rewriter, get("/rewrite/assets/app.js")).await.expect("routed");
        assert_eq!(
            json!({"uri": "/assets/app.js", "rewritten": null}),
            body_json(res).await
        );

        let res = route(&rewriter, get("/rewrite/api/users")).await.expect("routed");
        assert_eq!(json!({"uri": "/api/users", "rewritten": null}), body_json(res).await);
    }

    #[tokio::test]
    async fn rewrite_preview_keeps_percent_encoding() {
        let rewriter = Rewriter::default();

        let res = route(&rewriter, get("/rewrite/caf%C3%A9")).await.expect("routed");
        assert_eq!(
            json!({"uri": "/caf%C3%A9", "rewritten": "/index.html"}),
            body_json(res).await
        );

        // `%2E` is not a dot, so this is still a route
        let res = route(&rewriter, get("/rewrite/app%2Ejs")).await.expect("routed");
        assert_eq!(
            json!({"uri": "/app%2Ejs", "rewritten": "/index.html"}),
            body_json(res).await
        );
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let rewriter = Rewriter::default();
        for req in [get("/"), get("/invoke"), get("/rewrites/x"), post("/healthz", "")] {
            let res = route(&rewriter, req).await.expect("routed");
            assert_eq!(StatusCode::NOT_FOUND, res.status());
        }
    }
}
