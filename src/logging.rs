//! Tracing setup for the command-line entry points.
//!
//! `RUST_LOG` takes precedence over `--verbose`; `--quiet` silences
//! everything.

use std::io::{self, IsTerminal};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init(verbose: bool, quiet: bool) {
    let env_filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(verbose)
        .without_time();

    // A subscriber may already be installed when running under tests.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "jobhunt=debug" } else { "jobhunt=warn" }
}
