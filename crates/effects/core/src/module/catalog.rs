use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::ModuleDefinition;
use crate::config::EngineConfig;
use crate::error::ConfigurationError;

/// Dense index of a module inside its registry.
///
/// Handles are positions in [`ModuleRegistry::definitions`], so per-step
/// bookkeeping indexes by integer instead of hashing module id strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleHandle(u16);

impl ModuleHandle {
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Read-only enumeration of module definitions.
pub trait ModuleRegistry {
    /// Every definition, in resolution order.
    fn definitions(&self) -> &[Arc<ModuleDefinition>];

    fn definition(&self, handle: ModuleHandle) -> Option<&Arc<ModuleDefinition>> {
        self.definitions().get(handle.index())
    }

    fn handle_of(&self, id: &str) -> Option<ModuleHandle> {
        self.definitions()
            .iter()
            .position(|def| def.id() == id)
            .and_then(|index| u16::try_from(index).ok())
            .map(ModuleHandle::new)
    }
}

impl<R: ModuleRegistry + ?Sized> ModuleRegistry for Arc<R> {
    fn definitions(&self) -> &[Arc<ModuleDefinition>] {
        (**self).definitions()
    }

    fn handle_of(&self, id: &str) -> Option<ModuleHandle> {
        (**self).handle_of(id)
    }
}

impl<R: ModuleRegistry + ?Sized> ModuleRegistry for &R {
    fn definitions(&self) -> &[Arc<ModuleDefinition>] {
        (**self).definitions()
    }

    fn handle_of(&self, id: &str) -> Option<ModuleHandle> {
        (**self).handle_of(id)
    }
}

/// In-memory registry that validates on registration.
///
/// Registration fails fast: a duplicate id or a full catalog is reported and
/// the offending module is never added.
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    definitions: Vec<Arc<ModuleDefinition>>,
    index: BTreeMap<String, ModuleHandle>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from definitions, stopping at the first rejection.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ModuleDefinition>,
    ) -> Result<Self, ConfigurationError> {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.register(definition)?;
        }
        info!(modules = catalog.len(), "module catalog built");
        Ok(catalog)
    }

    pub fn register(
        &mut self,
        definition: ModuleDefinition,
    ) -> Result<ModuleHandle, ConfigurationError> {
        if self.index.contains_key(definition.id()) {
            return Err(ConfigurationError::DuplicateModule {
                id: definition.id().to_owned(),
            });
        }
        let handle = u16::try_from(self.definitions.len())
            .ok()
            .filter(|_| self.definitions.len() < EngineConfig::MAX_MODULES)
            .map(ModuleHandle::new)
            .ok_or(ConfigurationError::CatalogFull {
                max: EngineConfig::MAX_MODULES,
            })?;

        debug!(
            module = definition.id(),
            %handle,
            effects = definition.effects().len(),
            handler = definition.has_handler(),
            "module registered"
        );
        self.index.insert(definition.id().to_owned(), handle);
        self.definitions.push(Arc::new(definition));
        Ok(handle)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ModuleDefinition>> {
        self.index
            .get(id)
            .and_then(|handle| self.definitions.get(handle.index()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModuleDefinition>> {
        self.definitions.iter()
    }
}

impl ModuleRegistry for ModuleCatalog {
    fn definitions(&self) -> &[Arc<ModuleDefinition>] {
        &self.definitions
    }

    fn handle_of(&self, id: &str) -> Option<ModuleHandle> {
        self.index.get(id).copied()
    }
}
