//! I/O helpers for metarules commands.

pub mod config;
pub mod metadata_store;
