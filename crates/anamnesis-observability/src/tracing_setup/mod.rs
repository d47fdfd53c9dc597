//! Tracing setup: structured logging with span definitions.

pub mod spans;

use std::sync::Once;

use anamnesis_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "ANAMNESIS_LOG";

/// Initialize the tracing subscriber.
///
/// `ANAMNESIS_LOG` takes precedence over `config.log_level`. JSON output when
/// `config.json` is set. Idempotent: later calls are ignored.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter, config.json);
}

/// Initialize tracing with an explicit filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), false);
}

fn install(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        let result = if json {
            registry
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
        // The host process may own the global subscriber; keep it.
        if let Err(err) = result {
            tracing::debug!(error = %err, "global subscriber already set, not replacing it");
        }
    });
}
