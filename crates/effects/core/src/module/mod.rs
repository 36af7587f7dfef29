//! Module definitions and the registry that enumerates them.
//!
//! A module is an installable capability: an id, an ordered list of
//! [`EffectDescriptor`]s and an optional [`ModuleHandler`]. Definitions are
//! built once through [`ModuleBuilder`], validated, and shared read-only via
//! `Arc` for the lifetime of the process.
mod catalog;

pub use catalog::{ModuleCatalog, ModuleHandle, ModuleRegistry};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{EffectDescriptor, EffectMask};
use crate::error::ConfigurationError;
use crate::handler::ModuleHandler;

/// Grouping used by menus and documentation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Survival,
    #[default]
    Auxiliary,
    Combat,
    Energy,
}

/// Whether `id` is a legal module id: non-empty ASCII `[A-Za-z0-9_]`.
///
/// Excluding `:` keeps the `"<module_id>:<key>"` storage namespace
/// unambiguous.
pub fn is_valid_module_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// One installable capability module.
pub struct ModuleDefinition {
    id: String,
    display_name: String,
    category: Category,
    max_level: u32,
    effects: Vec<EffectDescriptor>,
    handler: Option<Arc<dyn ModuleHandler>>,
    mask: EffectMask,
}

impl ModuleDefinition {
    pub const DEFAULT_MAX_LEVEL: u32 = 5;

    pub fn builder(id: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Descriptors in declaration order.
    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.effects
    }

    pub fn handler(&self) -> Option<&dyn ModuleHandler> {
        self.handler.as_deref()
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Union of the phases this module's descriptors take part in.
    pub fn mask(&self) -> EffectMask {
        self.mask
    }

    pub fn contributes(&self, phase: EffectMask) -> bool {
        self.mask.intersects(phase)
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("max_level", &self.max_level)
            .field("effects", &self.effects)
            .field("handler", &self.handler.as_ref().map(|h| h.description()))
            .finish()
    }
}

/// Builder for [`ModuleDefinition`].
pub struct ModuleBuilder {
    id: String,
    display_name: Option<String>,
    category: Category,
    max_level: u32,
    effects: Vec<EffectDescriptor>,
    handler: Option<Arc<dyn ModuleHandler>>,
}

impl ModuleBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            category: Category::default(),
            max_level: ModuleDefinition::DEFAULT_MAX_LEVEL,
            effects: Vec::new(),
            handler: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level.max(1);
        self
    }

    pub fn effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn effects(mut self, effects: impl IntoIterator<Item = EffectDescriptor>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn handler(self, handler: impl ModuleHandler + 'static) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Attaches a handler that is already shared elsewhere.
    pub fn shared_handler(mut self, handler: Arc<dyn ModuleHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<ModuleDefinition, ConfigurationError> {
        if !is_valid_module_id(&self.id) {
            return Err(ConfigurationError::InvalidModuleId { id: self.id });
        }

        let mut seen = BTreeSet::new();
        for effect in &self.effects {
            if !seen.insert(effect.effect_id()) {
                return Err(ConfigurationError::DuplicateEffect {
                    module: self.id.clone(),
                    effect: effect.effect_id().to_owned(),
                });
            }
        }

        let mask = self
            .effects
            .iter()
            .fold(EffectMask::empty(), |mask, effect| mask | effect.kind().mask());

        Ok(ModuleDefinition {
            display_name: self.display_name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            category: self.category,
            max_level: self.max_level,
            effects: self.effects,
            handler: self.handler,
            mask,
        })
    }
}
