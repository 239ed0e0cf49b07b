//! CLI infrastructure for the tictactoe-live binary
//!
//! This module provides the `serve`, `train` and `play` commands plus the
//! logging setup shared by all of them.

use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod output;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info` (or `debug` with `verbose`)
/// for this crate and `warn` for everything else.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,tictactoe_live=debug"
    } else {
        "warn,tictactoe_live=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
