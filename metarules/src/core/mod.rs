//! Deterministic, pure logic of the rule engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! metadata and return deterministic outputs suitable for tests.

pub mod action;
pub mod details;
pub mod error;
pub mod inputs;
pub mod notation;
pub mod registry;
pub mod script;
pub mod spec;
pub mod status_validator;
pub mod types;
