//! Component metadata rules for resolved external modules.
//!
//! Build authors register rules that inspect and rewrite the metadata of a
//! resolved module (its status, status scheme, `changing` flag) before that
//! metadata is used to build the dependency graph. The architecture keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (notation parsing, predicates,
//!   rule actions, the rule registry, status validation). No I/O.
//! - **[`io`]**: Rules files and module metadata documents on disk.
//!
//! [`handler`] is the public entry point: it registers rules and processes
//! metadata. [`apply`] drives it from a rules file for the CLI.
//!
//! ```
//! use metarules::core::types::{MetadataOrigin, ModuleMetadata, ModuleVersionIdentifier};
//! use metarules::handler::{ComponentMetadataHandler, ComponentMetadataProcessor};
//!
//! let mut handler = ComponentMetadataHandler::new();
//! handler
//!     .with_module_fn("org.acme:widget", |details| {
//!         details.set_status("release");
//!         Ok(())
//!     })
//!     .expect("valid module notation");
//!
//! let mut metadata = ModuleMetadata::new(
//!     ModuleVersionIdentifier::new("org.acme", "widget", "1.0"),
//!     "integration",
//!     MetadataOrigin::Maven,
//! );
//! handler.process_metadata(&mut metadata).expect("rules apply");
//! assert_eq!(metadata.status, "release");
//! ```

pub mod apply;
pub mod core;
pub mod deprecation;
pub mod exit_codes;
pub mod handler;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
