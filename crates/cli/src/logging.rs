//! Logger setup for the CLI.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` once.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug`
/// with `verbose`. Logs go to stderr so stdout stays a clean trace.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else if verbose {
            builder.filter_level(log::LevelFilter::Debug);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.target(env_logger::Target::Stderr);
        builder.init();

        log::debug!("logging initialized");
    });
}
