//! Tracing initialization.
//!
//! Diagnostics go to stderr through `tracing`; the user-facing summary lines
//! in [`output`](crate::output) go to stdout, so the two never interleave in
//! a pipe.

use tracing_subscriber::{EnvFilter, fmt};

/// Map `-v` repetitions to a level for this crate.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity` when set.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sleep_screen={}", level_for(verbosity))));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
