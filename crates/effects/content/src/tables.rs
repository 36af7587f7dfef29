//! Name tables resolving callbacks and handlers referenced from data files.
//!
//! RON module files cannot carry code, so effects and modules name their
//! callbacks and handlers. The tables map those names to live objects before
//! the core builders run.

use std::collections::BTreeMap;
use std::sync::Arc;

use effect_core::{
    ConfigurationError, DamageEvent, EffectCallback, HookResult, ModuleHandler, ResolutionContext,
};

use crate::handlers::{EmergencyShieldHandler, OverclockHandler, RangedBoostHandler};

/// Callbacks addressable by name.
#[derive(Clone, Debug, Default)]
pub struct CallbackTable {
    callbacks: BTreeMap<String, EffectCallback>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in callbacks:
    ///
    /// - `lifesteal`: on hit, heals 5% of the damage dealt per module level
    /// - `pulse_counter`: periodic, counts firings in module storage `pulses`
    /// - `mark_attacker`: on hurt, remembers the attacker id in `last_attacker`
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(EffectCallback::new("lifesteal", lifesteal));
        table.insert(EffectCallback::new("pulse_counter", pulse_counter));
        table.insert(EffectCallback::new("mark_attacker", mark_attacker));
        table
    }

    /// Adds or replaces a callback under its own name.
    pub fn insert(&mut self, callback: EffectCallback) -> Option<EffectCallback> {
        self.callbacks.insert(callback.name().to_owned(), callback)
    }

    pub fn get(&self, name: &str) -> Option<&EffectCallback> {
        self.callbacks.get(name)
    }

    /// Looks a callback up, failing with `UnknownCallback`.
    pub fn resolve(&self, name: &str) -> Result<EffectCallback, ConfigurationError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownCallback {
                name: name.to_owned(),
            })
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Handlers addressable by name, shared by every module that names them.
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: BTreeMap<String, Arc<dyn ModuleHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding `ranged_boost`, `emergency_shield` and `overclock` with
    /// their default tuning.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("ranged_boost", RangedBoostHandler::default());
        table.insert("emergency_shield", EmergencyShieldHandler::default());
        table.insert("overclock", OverclockHandler::default());
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: impl ModuleHandler + 'static) {
        self.insert_shared(name, Arc::new(handler));
    }

    pub fn insert_shared(&mut self, name: impl Into<String>, handler: Arc<dyn ModuleHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Looks a handler up, failing with `UnknownHandler`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ModuleHandler>, ConfigurationError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownHandler {
                name: name.to_owned(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

// ============================================================================
// Built-in callbacks
// ============================================================================

const LIFESTEAL_PER_LEVEL: f64 = 0.05;

fn lifesteal(ctx: &mut ResolutionContext<'_>, event: Option<&DamageEvent>) -> HookResult {
    if let Some(event) = event {
        let amount = event.amount * LIFESTEAL_PER_LEVEL * f64::from(ctx.level());
        if amount > 0.0 {
            ctx.carrier_mut().heal(amount);
        }
    }
    Ok(())
}

fn pulse_counter(ctx: &mut ResolutionContext<'_>, _event: Option<&DamageEvent>) -> HookResult {
    let pulses = ctx.storage_long("pulses", 0);
    ctx.set_storage("pulses", pulses.saturating_add(1));
    Ok(())
}

fn mark_attacker(ctx: &mut ResolutionContext<'_>, event: Option<&DamageEvent>) -> HookResult {
    if let Some(attacker) = event.and_then(|e| e.source.attacker) {
        ctx.set_storage("last_attacker", i64::from(attacker.0));
    }
    Ok(())
}
