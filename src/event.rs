//! The request/response shapes exchanged with the edge runtime.
//!
//! The runtime hands over an event with a nested `request` object and expects
//! that same request object back. Fields the rewriter does not know about are
//! carried through verbatim.

use std::io::{Read, Write};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rewriter::Rewriter;

/// An inbound viewer-request event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeEvent {
    pub request: EdgeRequest,
    /// `version`, `context`, `viewer` and anything else the runtime sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The request part of an [`EdgeEvent`].
///
/// `uri` is the path only; the runtime delivers the query string separately
/// under `querystring`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRequest {
    pub uri: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            extra: Map::new(),
        }
    }
}

impl EdgeEvent {
    #[cfg(test)]
    pub fn new(request: EdgeRequest) -> Self {
        Self {
            request,
            extra: Map::new(),
        }
    }
}

/// The edge handler entry point: event in, request out.
pub fn handle_event(rewriter: &Rewriter, event: EdgeEvent) -> EdgeRequest {
    rewriter.handle(event.request)
}

/// Parse an event from raw JSON bytes.
pub fn parse_event(data: &[u8]) -> anyhow::Result<EdgeEvent> {
    serde_json::from_slice(data).context("Invocation body was not a valid edge event")
}

/// Run a single invocation: read one JSON event from `input` and write the
/// resulting request as JSON to `output`.
pub fn invoke(rewriter: &Rewriter, mut input: impl Read, mut output: impl Write) -> anyhow::Result<()> {
    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .context("Couldn't read invocation event")?;

    let request = handle_event(rewriter, parse_event(&data)?);

    serde_json::to_writer(&mut output, &request).context("Couldn't write rewritten request")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
