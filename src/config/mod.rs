//! Configuration resolution and typed views.

pub mod defaults;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod store;
pub mod types;
pub mod validate;

use std::path::Path;

pub use defaults::{default_tree, CONFIG_PATH};
pub use resolver::{resolve, ResolveOutcome};
pub use types::*;

use crate::common::error::ConfigResult;

/// Resolve the override file at `path` onto the defaults and build the
/// typed configuration from the result.
pub fn load(path: impl AsRef<Path>) -> ConfigResult<(AppConfig, ResolveOutcome)> {
    let resolved = resolve(default_tree(), path)?;
    let config = AppConfig::from_tree(&resolved.tree)?;
    Ok((config, resolved.outcome))
}
