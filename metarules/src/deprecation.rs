//! Deprecation notices for legacy registration entry points.

use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::warn;

/// Receives deprecation notices. Fire-and-forget.
pub trait DeprecationReporter: Send + Sync {
    fn warn_once(&self, message: &str);
}

/// Logs each distinct message once via `tracing`.
#[derive(Debug, Default)]
pub struct TracingDeprecationReporter {
    seen: Mutex<HashSet<String>>,
}

impl DeprecationReporter for TracingDeprecationReporter {
    fn warn_once(&self, message: &str) {
        if self.seen.lock().insert(message.to_string()) {
            warn!(target: "metarules::deprecation", "{message}");
        }
    }
}
