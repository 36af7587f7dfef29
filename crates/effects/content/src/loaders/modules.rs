//! Module catalog loader.
//!
//! Reads RON module files and builds [`ModuleDefinition`]s through the core
//! builders, so data-defined modules pass the same validation as modules
//! written in code.

use std::path::Path;

use effect_core::{
    Category, ConfigurationError, EffectDescriptor, EngineError, ModuleCatalog, ModuleDefinition,
    Operation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::loaders::{LoadResult, read_file};
use crate::tables::{CallbackTable, HandlerTable};

const BASELINE_MODULES: &str = include_str!("../../data/modules/baseline.ron");

/// Top-level shape of a module file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleFile {
    pub modules: Vec<ModuleSpec>,
}

/// One module as written in data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
    /// Name looked up in the [`HandlerTable`].
    #[serde(default)]
    pub handler: Option<String>,
}

fn default_max_level() -> u32 {
    ModuleDefinition::DEFAULT_MAX_LEVEL
}

/// One effect as written in data. Unset fields keep the builder defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EffectSpec {
    StatModifier {
        stat: String,
        base: f64,
        #[serde(default)]
        per_level: f64,
        #[serde(default)]
        operation: Operation,
        #[serde(default)]
        id: Option<String>,
    },
    StatusEffect {
        status: String,
        #[serde(default)]
        duration: Option<u32>,
        #[serde(default)]
        amplifier: Option<i32>,
        #[serde(default)]
        amplifier_per_level: Option<i32>,
        #[serde(default)]
        ambient: Option<bool>,
        #[serde(default)]
        show_particles: Option<bool>,
        #[serde(default)]
        id: Option<String>,
    },
    Healing {
        #[serde(default)]
        base: Option<f64>,
        #[serde(default)]
        per_level: Option<f64>,
        #[serde(default)]
        interval: Option<u32>,
        #[serde(default)]
        cost: u32,
        #[serde(default)]
        id: Option<String>,
    },
    ResourceRestore {
        #[serde(default)]
        amount: Option<i32>,
        #[serde(default)]
        per_level: Option<i32>,
        #[serde(default)]
        saturation: Option<f64>,
        #[serde(default)]
        interval: Option<u32>,
        #[serde(default)]
        cost: u32,
        #[serde(default)]
        id: Option<String>,
    },
    DamageBoost {
        base: f64,
        #[serde(default)]
        per_level: f64,
        #[serde(default)]
        id: Option<String>,
    },
    DamageReduction {
        base: f64,
        #[serde(default)]
        per_level: f64,
        /// Empty means every damage type.
        #[serde(default)]
        damage_types: Vec<String>,
        #[serde(default)]
        id: Option<String>,
    },
    DamageReflection {
        base: f64,
        #[serde(default)]
        per_level: f64,
        #[serde(default)]
        id: Option<String>,
    },
    PeriodicCallback {
        callback: String,
        #[serde(default)]
        interval: Option<u32>,
        #[serde(default)]
        cost: u32,
        #[serde(default)]
        id: Option<String>,
    },
    OnHit {
        callback: String,
        #[serde(default)]
        cost: u32,
        #[serde(default)]
        id: Option<String>,
    },
    OnHurt {
        callback: String,
        #[serde(default)]
        cost: u32,
        #[serde(default)]
        id: Option<String>,
    },
}

/// Applies `setter` only when the data supplied a value.
fn set<B, T>(builder: B, value: Option<T>, setter: impl FnOnce(B, T) -> B) -> B {
    match value {
        Some(value) => setter(builder, value),
        None => builder,
    }
}

impl EffectSpec {
    /// Builds the descriptor, resolving callback names through `callbacks`.
    pub fn build(&self, callbacks: &CallbackTable) -> Result<EffectDescriptor, ConfigurationError> {
        match self.clone() {
            Self::StatModifier {
                stat,
                base,
                per_level,
                operation,
                id,
            } => {
                let builder = EffectDescriptor::stat_modifier(stat)
                    .base_value(base)
                    .per_level(per_level)
                    .operation(operation);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::StatusEffect {
                status,
                duration,
                amplifier,
                amplifier_per_level,
                ambient,
                show_particles,
                id,
            } => {
                let builder = EffectDescriptor::status_effect(status);
                let builder = set(builder, duration, |b, v| b.duration(v));
                let builder = set(builder, amplifier, |b, v| b.amplifier(v));
                let builder = set(builder, amplifier_per_level, |b, v| b.amplifier_per_level(v));
                let builder = set(builder, ambient, |b, v| b.ambient(v));
                let builder = set(builder, show_particles, |b, v| b.show_particles(v));
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::Healing {
                base,
                per_level,
                interval,
                cost,
                id,
            } => {
                let builder = EffectDescriptor::healing().resource_cost(cost);
                let builder = set(builder, base, |b, v| b.base_value(v));
                let builder = set(builder, per_level, |b, v| b.per_level(v));
                let builder = set(builder, interval, |b, v| b.interval(v));
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::ResourceRestore {
                amount,
                per_level,
                saturation,
                interval,
                cost,
                id,
            } => {
                let builder = EffectDescriptor::resource_restore().resource_cost(cost);
                let builder = set(builder, amount, |b, v| b.amount(v));
                let builder = set(builder, per_level, |b, v| b.per_level(v));
                let builder = set(builder, saturation, |b, v| b.saturation(v));
                let builder = set(builder, interval, |b, v| b.interval(v));
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::DamageBoost {
                base,
                per_level,
                id,
            } => {
                let builder = EffectDescriptor::damage_boost()
                    .base_value(base)
                    .per_level(per_level);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::DamageReduction {
                base,
                per_level,
                damage_types,
                id,
            } => {
                let builder = EffectDescriptor::damage_reduction()
                    .base_value(base)
                    .per_level(per_level)
                    .damage_types(damage_types);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::DamageReflection {
                base,
                per_level,
                id,
            } => {
                let builder = EffectDescriptor::damage_reflection()
                    .base_value(base)
                    .per_level(per_level);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::PeriodicCallback {
                callback,
                interval,
                cost,
                id,
            } => {
                let builder =
                    EffectDescriptor::periodic_callback(callbacks.resolve(&callback)?)
                        .resource_cost(cost);
                let builder = set(builder, interval, |b, v| b.interval(v));
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::OnHit { callback, cost, id } => {
                let builder = EffectDescriptor::on_hit_callback(callbacks.resolve(&callback)?)
                    .resource_cost(cost);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
            Self::OnHurt { callback, cost, id } => {
                let builder = EffectDescriptor::on_hurt_callback(callbacks.resolve(&callback)?)
                    .resource_cost(cost);
                set(builder, id, |b, v| b.effect_id(v)).build()
            }
        }
    }
}

impl ModuleSpec {
    /// Builds the module definition through [`ModuleDefinition::builder`].
    pub fn build(
        &self,
        callbacks: &CallbackTable,
        handlers: &HandlerTable,
    ) -> Result<ModuleDefinition, ConfigurationError> {
        let effects = self
            .effects
            .iter()
            .map(|effect| effect.build(callbacks))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ModuleDefinition::builder(self.id.as_str())
            .category(self.category)
            .max_level(self.max_level)
            .effects(effects);
        if let Some(name) = &self.display_name {
            builder = builder.display_name(name.as_str());
        }
        if let Some(handler) = &self.handler {
            builder = builder.shared_handler(handlers.resolve(handler)?);
        }
        builder.build()
    }
}

/// Loader for module definitions from RON files.
pub struct ModuleLoader;

impl ModuleLoader {
    /// Load module definitions from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a RON file holding `(modules: [...])`
    /// * `callbacks` - Callbacks effects may name
    /// * `handlers` - Handlers modules may name
    pub fn load(
        path: &Path,
        callbacks: &CallbackTable,
        handlers: &HandlerTable,
    ) -> LoadResult<Vec<ModuleDefinition>> {
        let content = read_file(path)?;
        Self::from_str(&content, callbacks, handlers)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    /// Parse module definitions from RON text.
    ///
    /// A file that is not valid RON fails as a whole. A module that parses
    /// but fails validation is logged and left out, so its siblings still
    /// load.
    pub fn from_str(
        content: &str,
        callbacks: &CallbackTable,
        handlers: &HandlerTable,
    ) -> LoadResult<Vec<ModuleDefinition>> {
        let file: ModuleFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse modules RON: {}", e))?;

        let mut definitions = Vec::with_capacity(file.modules.len());
        for spec in &file.modules {
            let definition = match spec.build(callbacks, handlers) {
                Ok(definition) => definition,
                Err(error) => {
                    warn!(
                        module = %spec.id,
                        code = error.error_code(),
                        %error,
                        "invalid module skipped"
                    );
                    continue;
                }
            };
            debug!(
                module = definition.id(),
                effects = definition.effects().len(),
                handler = definition.has_handler(),
                "module loaded"
            );
            definitions.push(definition);
        }
        Ok(definitions)
    }

    /// Load a RON file straight into a catalog.
    pub fn load_catalog(
        path: &Path,
        callbacks: &CallbackTable,
        handlers: &HandlerTable,
    ) -> LoadResult<ModuleCatalog> {
        let definitions = Self::load(path, callbacks, handlers)?;
        Ok(ModuleCatalog::from_definitions(definitions)?)
    }

    /// The embedded baseline catalog, built against the built-in tables.
    pub fn builtin_catalog() -> LoadResult<ModuleCatalog> {
        let definitions = Self::from_str(
            BASELINE_MODULES,
            &CallbackTable::builtin(),
            &HandlerTable::builtin(),
        )?;
        Ok(ModuleCatalog::from_definitions(definitions)?)
    }
}
