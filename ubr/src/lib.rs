//! A library for redirecting to pre-built binaries in GitHub releases.
//!
//! UBR stands for "Universal Binary Redirector". It is a small HTTP service that answers
//! `GET /{owner}/{repo}/{format}/{architecture}` with a redirect to a matching asset in the
//! latest GitHub release for `owner/repo`. This makes it possible to give out a stable URL for
//! "the newest Linux tarball of this project" in install scripts and docs.
//!
//! This project also ships a server binary named `ubr-server`. It is configured entirely by
//! environment variables:
//!
//! - `PORT` - the port to listen on. Defaults to 8080.
//! - `UBR_API_BASE_URL` - the GitHub API to talk to. Defaults to `https://api.github.com`.
//! - `UBR_LOG_LEVEL` - one of `off`, `error`, `warn`, `info`, `debug`, or `trace`. Defaults to
//!   `info`.
//!
//! Here is how to run the same thing from your own code:
//!
//! ```ignore
//! use ubr::{Config, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
//!     let resolver = Resolver::new(config.api_base_url)?;
//!
//!     ubr::serve(listener, resolver, std::future::pending()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How `ubr` Picks an Asset
//!
//! Each request does a single `GET /repos/{owner}/{repo}/releases/latest` against the API, with a
//! two second timeout. There is no caching, so every request sees the current latest release.
//!
//! The `{format}` and `{architecture}` path segments are looked up, exactly and case-sensitively,
//! in a small table of rules. Right now there is one rule:
//!
//! - `gzip` + `linux` - the asset's content type must be exactly `application/gzip` and its name
//!   must contain `linux`, ignoring case.
//!
//! Any other pair has no rule and never matches anything. When there is a rule, the assets are
//! checked in the order the API returns them and the first one that matches wins.
//!
//! The response is a `302` to the asset's `browser_download_url`, a `404` if nothing matched, or a
//! `500` if the API could not be reached or did not return a release. The API's status code is not
//! checked. An error document from the API, like the one returned for a project with no releases,
//! has no assets, so it results in a `404`.
//!
//! ## Features
//!
//! This crate offers several features to control the TLS dependency used by `reqwest`:
//!
#![doc = document_features::document_features!()]

mod assets;
mod config;
mod picker;
mod resolver;
mod router;

pub use crate::{
    assets::{Asset, Query},
    config::{Config, ConfigError},
    resolver::{ResolveError, Resolver, DEFAULT_API_BASE_URL, UPSTREAM_TIMEOUT},
    router::{router, serve},
};

// The version of the `ubr` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "logging")]
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};

/// This function initializes logging for the application. It's public for the sake of the
/// `ubr-server` binary, but it lives in the library crate so that test code can also enable
/// logging.
///
/// # Errors
///
/// This can return a `log::SetLoggerError` error.
#[cfg(feature = "logging")]
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let line_colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightBlack)
        .debug(Color::BrightBlack)
        .trace(Color::BrightBlack);
    let level_colors = line_colors.info(Color::Green).debug(Color::Black);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{target}][{level}{color_line}] {message}\x1B[0m",
                color_line = format_args!(
                    "\x1B[{}m",
                    line_colors.get_color(&record.level()).to_fg_str()
                ),
                target = record.target(),
                level = level_colors.color(record.level()),
                message = message,
            ));
        })
        .level(level)
        // These are very noisy.
        .level_for("hyper", log::LevelFilter::Error)
        .level_for("hyper_util", log::LevelFilter::Error)
        .level_for("reqwest", log::LevelFilter::Error)
        .chain(std::io::stderr())
        .apply()
}
