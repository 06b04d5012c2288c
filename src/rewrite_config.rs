use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::rewriter::RewriteConfiguration;

/// Everything the binary needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct AppConfiguration {
    pub rewrite: RewriteConfiguration,
    pub mode: InvocationMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationMode {
    /// Read one event from stdin and write the request to stdout.
    Stdin,
    /// Accept invocations over HTTP.
    Serve(HttpConfiguration),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfiguration {
    pub listen_on: SocketAddr,
}

/// The on-disk configuration file, e.g. `level = 1`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteFileConfiguration {
    pub level: Option<i64>,
}

impl RewriteFileConfiguration {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        tracing::info!(?path, "Loading rewrite config file");
        let data = std::fs::read(path)
            .with_context(|| format!("Couldn't read rewrite config file at {}", path.display()))?;
        toml::from_slice(&data).with_context(|| {
            format!(
                "File {} contained invalid TOML or was not a rewrite config",
                path.display()
            )
        })
    }
}

/// Merge the config file and the command line value. The command line wins.
pub fn resolve_rewrite_configuration(
    file: Option<&RewriteFileConfiguration>,
    level_arg: Option<&str>,
) -> anyhow::Result<RewriteConfiguration> {
    let level = match (level_arg, file.and_then(|f| f.level)) {
        (Some(text), _) => parse_level(text)?,
        (None, Some(value)) => validate_level(value)?,
        (None, None) => 0,
    };
    Ok(RewriteConfiguration { level })
}

pub fn parse_level(text: &str) -> anyhow::Result<usize> {
    let value: i64 = text
        .trim()
        .parse()
        .with_context(|| format!("Invalid level '{}', expected a non-negative integer", text))?;
    validate_level(value)
}

fn validate_level(value: i64) -> anyhow::Result<usize> {
    usize::try_from(value)
        .map_err(|_| anyhow::anyhow!("Level must not be negative, got {}", value))
}
