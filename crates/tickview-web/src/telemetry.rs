//! Log subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise tickview targets log at `info`, or at
//! `debug` with `--debug`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::WebError;

const TARGETS: [&str; 3] = ["tickview", "tickview_core", "tickview_web"];

pub fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    let mut directives: Vec<String> = TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push(format!("tower_http={level}"));
    directives.join(",")
}

pub fn init(debug: bool) -> Result<(), WebError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|error| WebError::Telemetry(error.to_string()))
}
