//! Structured logging setup.
//!
//! Logs always go to stderr: in `serve` mode stdout is the MCP channel and
//! in `hook` mode it carries the hook's JSON reply.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "OBSIDIAN_MCP_LOG";

/// Install the global subscriber.
///
/// Filter precedence: `RUST_LOG`, then [`LOG_ENV`], then `--log-level`,
/// then `--verbose` (debug) or the default (info).
pub fn init_tracing(verbose: bool, log_level: Option<&str>, log_json: bool) -> anyhow::Result<()> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "info",
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| {
            EnvFilter::new(if level.contains('=') {
                level.to_string()
            } else {
                format!("obsidian_mcp={}", level)
            })
        });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}
