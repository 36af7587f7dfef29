//! Per-step driver of module effects.
//!
//! The [`Scheduler`] resolves every Active module of every carrier once per
//! tick, keeps attached modifiers in sync with module levels, tears effects
//! down when modules deactivate, and aggregates cross-module damage math when
//! the host reports a combat event during the same tick.
//!
//! The scheduler itself is immutable. All per-carrier bookkeeping lives in an
//! [`EffectSession`] the host owns and passes in by `&mut`.
//!
//! [`EffectSession`]: crate::state::EffectSession

mod combat;
mod isolation;
mod resolve;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::ModuleFault;
use crate::module::{ModuleCatalog, ModuleDefinition, ModuleHandle, ModuleRegistry};
use crate::state::{CarrierEffectState, CoreAccess, Tick};

/// Summary of one `step` (or one carrier release).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    pub tick: Tick,
    /// Carriers with an equipped Core that were resolved.
    pub carriers: usize,
    /// Modules that went Inactive → Active.
    pub activated: usize,
    /// Modules that went Active → Inactive.
    pub deactivated: usize,
    /// Active modules skipped because their passive drain could not be paid.
    pub starved: usize,
    pub faults: Vec<ModuleFault>,
}

impl StepReport {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Resolves module effects against carriers.
pub struct Scheduler<R = ModuleCatalog> {
    registry: R,
    config: EngineConfig,
}

impl<R: ModuleRegistry> Scheduler<R> {
    pub fn new(registry: R) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: R, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn handles(&self) -> impl Iterator<Item = (ModuleHandle, &Arc<ModuleDefinition>)> {
        self.registry
            .definitions()
            .iter()
            .enumerate()
            .map_while(|(index, definition)| {
                u16::try_from(index)
                    .ok()
                    .map(|raw| (ModuleHandle::new(raw), definition))
            })
    }

    /// `(module, level)` pairs Active for a carrier at `tick`.
    ///
    /// Uses the snapshot recorded by this tick's resolution pass, falling back
    /// to querying the Core when the carrier has not resolved yet this tick.
    fn active_modules(
        &self,
        state: &CarrierEffectState,
        core: &dyn CoreAccess,
        tick: Tick,
    ) -> Vec<(ModuleHandle, u32)> {
        if let Some(snapshot) = state.snapshot_at(tick) {
            return snapshot.active.clone();
        }
        self.handles()
            .filter_map(|(handle, definition)| {
                let level = core.module_level(definition.id());
                (core.is_module_active(definition.id()) && level > 0).then_some((handle, level))
            })
            .collect()
    }

    /// Reduction cap from the config, clamped to `[0, 1]`.
    fn reduction_cap(&self) -> f64 {
        let cap = self.config.reduction_cap;
        if cap.is_finite() {
            cap.clamp(0.0, 1.0)
        } else {
            EngineConfig::DEFAULT_REDUCTION_CAP
        }
    }
}
