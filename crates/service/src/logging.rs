//! Logger setup shared by the binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 5] = ["service", "catalog", "recommender", "access", "edulearn"];

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_directives = CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
