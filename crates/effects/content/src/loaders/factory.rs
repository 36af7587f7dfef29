//! Content factory for building the engine's inputs from a data directory.

use std::path::{Path, PathBuf};

use effect_core::{EngineConfig, ModuleCatalog, ModuleDefinition};
use tracing::info;

use crate::loaders::{ConfigLoader, LoadResult, ModuleLoader};
use crate::tables::{CallbackTable, HandlerTable};

/// Content factory that loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── modules/
///     ├── baseline.ron
///     └── expansion.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load every `modules/*.ron` file, in file name order, into one catalog.
    ///
    /// Module ids must be unique across files.
    pub fn load_catalog(
        &self,
        callbacks: &CallbackTable,
        handlers: &HandlerTable,
    ) -> LoadResult<ModuleCatalog> {
        let modules_dir = self.data_dir.join("modules");
        let mut files = std::fs::read_dir(&modules_dir)
            .map_err(|e| {
                anyhow::anyhow!("Failed to read directory {}: {}", modules_dir.display(), e)
            })?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        files.retain(|path| path.extension().is_some_and(|ext| ext == "ron"));
        files.sort();

        let mut definitions: Vec<ModuleDefinition> = Vec::new();
        for path in &files {
            definitions.extend(ModuleLoader::load(path, callbacks, handlers)?);
        }
        let catalog = ModuleCatalog::from_definitions(definitions)?;
        info!(
            files = files.len(),
            modules = catalog.len(),
            dir = %modules_dir.display(),
            "module content loaded"
        );
        Ok(catalog)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
