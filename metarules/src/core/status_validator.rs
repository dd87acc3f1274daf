//! Final status invariant.
//!
//! After every rule has run, a module's status must be one of the labels in
//! its status scheme.

use crate::core::error::ProcessError;
use crate::core::types::ModuleMetadata;

/// Check `metadata.status` against `metadata.status_scheme`.
pub fn validate_status(metadata: &ModuleMetadata) -> Result<(), ProcessError> {
    if metadata.status_scheme.iter().any(|s| *s == metadata.status) {
        return Ok(());
    }
    Err(ProcessError::InvalidStatus {
        id: metadata.id.clone(),
        status: metadata.status.clone(),
        scheme: metadata.status_scheme.clone(),
    })
}
