//! Local storage bootstrap.

pub mod bootstrap;

pub use bootstrap::{ensure_schema, BootstrapOutcome};
