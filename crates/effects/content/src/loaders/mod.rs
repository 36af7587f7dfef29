//! Content loaders for reading engine data from files.
//!
//! Module catalogs are RON, engine configuration is TOML.

pub mod config;
pub mod factory;
pub mod modules;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use modules::{EffectSpec, ModuleFile, ModuleLoader, ModuleSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
