//! Logging setup using tracing.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,parley=info";

/// Filter directives for a verbosity level. `RUST_LOG` wins when no `-v`
/// flag is given.
pub fn filter_for(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        1 => EnvFilter::new("info,parley=debug"),
        _ => EnvFilter::new("debug,parley=trace"),
    }
}

/// Install the global subscriber. Logs go to stderr so the demo transcript
/// on stdout stays readable.
pub fn init(verbosity: u8) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 0);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(console_layer)
        .try_init();
}
