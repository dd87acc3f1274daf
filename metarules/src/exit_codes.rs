//! Stable exit codes for metarules CLI commands.

/// Command succeeded; every module passed processing.
pub const OK: i32 = 0;
/// Invalid rules file, unreadable or schema-invalid metadata, or other errors.
pub const INVALID: i32 = 1;
/// At least one module was rejected by a rule or by status validation.
pub const REJECTED: i32 = 2;
