use crate::rewrite_config::{
    resolve_rewrite_configuration, AppConfiguration, HttpConfiguration, InvocationMode,
    RewriteFileConfiguration,
};
use clap::{App, Arg, ArgMatches};
use std::net::SocketAddr;

const ABOUT: &str = r#"
Rewrite single-page-application routes to their index.html fallback

Paths with no file extension are treated as client-side routes and rewritten to
index.html, optionally keeping a number of leading path segments (--level).
Paths under /api/ and paths ending in a file extension are returned unchanged.

By default one edge event is read from stdin as JSON and the resulting request
is written to stdout. With --listen, an HTTP server accepts events on POST /invoke,
and GET /rewrite/<path> previews a single path. Preview paths are not
percent-decoded, matching the uri the edge runtime hands to the function.
"#;

const LEVEL_ENV: &str = "SPA_REWRITE_LEVEL";

const ARG_CONFIG: &str = "config";
const ARG_LEVEL: &str = "level";
const ARG_LISTEN_ON: &str = "listen";

pub fn rewrite_app_definition() -> App<'static, 'static> {
    App::new("SPA Rewrite")
    .version(clap::crate_version!())
    .about(ABOUT)
    .arg(
        Arg::with_name(ARG_CONFIG)
            .short("c")
            .long("config")
            .value_name("REWRITE_TOML")
            .help("the path to a rewrite.toml configuration file")
            .takes_value(true),
    )
    .arg(
        Arg::with_name(ARG_LEVEL)
            .long("level")
            .value_name("LEVEL")
            .env(LEVEL_ENV)
            .allow_hyphen_values(true)
            .help("how many leading path segments to keep in front of index.html. Overrides the config file. Default: 0")
            .takes_value(true),
    )
    .arg(
        Arg::with_name(ARG_LISTEN_ON)
            .short("l")
            .long("listen")
            .value_name("IP_PORT")
            .takes_value(true)
            .help("serve invocations over HTTP on this IP address and port instead of reading stdin, e.g. 127.0.0.1:3000"),
    )
}

pub fn parse_command_line() -> anyhow::Result<AppConfiguration> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let app = rewrite_app_definition();

    let matches = app.get_matches();
    parse_configuration_from(matches)
}

pub fn parse_configuration_from(matches: ArgMatches) -> anyhow::Result<AppConfiguration> {
    let file_config = match matches.value_of(ARG_CONFIG).ignore_if_empty() {
        Some(path) => Some(RewriteFileConfiguration::read(std::path::Path::new(path))?),
        None => None,
    };

    let rewrite = resolve_rewrite_configuration(
        file_config.as_ref(),
        matches.value_of(ARG_LEVEL).ignore_if_empty(),
    )?;

    tracing::debug!(level = rewrite.level, "Rewrite configuration resolved");

    let mode = match matches.value_of(ARG_LISTEN_ON).ignore_if_empty() {
        Some(listen) => {
            let listen_on: SocketAddr = listen
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", listen, e))?;
            InvocationMode::Serve(HttpConfiguration { listen_on })
        }
        None => InvocationMode::Stdin,
    };

    Ok(AppConfiguration { rewrite, mode })
}

trait EmptyIgnorer {
    fn ignore_if_empty(&self) -> Self;
}

impl EmptyIgnorer for Option<&str> {
    fn ignore_if_empty(&self) -> Self {
        match self {
            Some("") => None,
            None => None,
            Some(s) => Some(s),
        }
    }
}
