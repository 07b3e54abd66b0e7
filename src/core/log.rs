//! Logging setup. Events go to stderr; stdout carries only the rendered view
//! so `fxconv convert` output stays pipeable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "fxconv";

fn verbosity(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// Only the crate's own events pass; dependencies stay quiet unless
/// `RUST_LOG` asks for them.
fn app_targets(verbose: bool) -> Targets {
    Targets::new().with_target(APP_TARGET, verbosity(verbose))
}

pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity(verbose).to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(app_targets(verbose))
        .with(env_filter)
        .init();
}
