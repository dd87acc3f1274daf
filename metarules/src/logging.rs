//! Diagnostic tracing for the rule engine.
//!
//! Rule skips and applications are logged at `debug`, deprecations at `warn`.
//! Output goes to stderr so processed metadata on stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber for the `metarules` binary.
///
/// Only deprecation notices and rejected modules show by default. Set
/// `RUST_LOG` to see per-rule decisions, for instance when a scoped rule
/// does not seem to fire:
///
/// ```bash
/// RUST_LOG=metarules::handler=debug metarules apply widget.json
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
