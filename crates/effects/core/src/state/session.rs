//! Per-session bookkeeping the scheduler keeps for every carrier.
//!
//! Nothing here is persisted. State is created lazily the first time a
//! carrier resolves and dropped when the carrier is removed or unequips its
//! Core.

use std::collections::BTreeMap;

use super::carrier::{ModifierKey, StatRef};
use super::common::{EntityId, Tick};
use crate::module::ModuleHandle;

/// Identifies one interval timer of one module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerKey {
    pub module: ModuleHandle,
    pub slot: TimerSlot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerSlot {
    /// A periodic descriptor, by position in the module's effect list.
    Effect(usize),
    /// The handler's `on_tick` when it declares a tick interval.
    HandlerTick,
    /// The handler's `on_second_tick`.
    SecondTick,
}

impl TimerKey {
    pub const fn effect(module: ModuleHandle, index: usize) -> Self {
        Self {
            module,
            slot: TimerSlot::Effect(index),
        }
    }

    pub const fn handler_tick(module: ModuleHandle) -> Self {
        Self {
            module,
            slot: TimerSlot::HandlerTick,
        }
    }

    pub const fn second_tick(module: ModuleHandle) -> Self {
        Self {
            module,
            slot: TimerSlot::SecondTick,
        }
    }
}

/// Last-fired tick for each interval timer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers(BTreeMap<TimerKey, Tick>);

impl Timers {
    /// Fires at most once per `interval` ticks for `key`, and never twice
    /// in one tick (an interval of `0` behaves like `1`).
    ///
    /// A timer that never fired fires immediately. Firing records `now`
    /// before the caller runs any gate of its own, so a gated-out firing
    /// waits for the next interval.
    pub fn should_trigger(&mut self, key: TimerKey, now: Tick, interval: u32) -> bool {
        let interval = u64::from(interval.max(1));
        let due = self
            .0
            .get(&key)
            .is_none_or(|last| now.since(*last) >= interval);
        if due {
            self.0.insert(key, now);
        }
        due
    }

    pub fn last_fired(&self, key: TimerKey) -> Option<Tick> {
        self.0.get(&key).copied()
    }

    pub fn clear_module(&mut self, module: ModuleHandle) {
        self.0.retain(|key, _| key.module != module);
    }

    pub fn has_module(&self, module: ModuleHandle) -> bool {
        self.0.keys().any(|key| key.module == module)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ready-at ticks for every `(module, key)` cooldown of a carrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cooldowns(BTreeMap<(ModuleHandle, String), Tick>);

impl Cooldowns {
    pub fn ready_at(&self, module: ModuleHandle, key: &str) -> Option<Tick> {
        self.0.get(&(module, key.to_owned())).copied()
    }

    pub fn set(&mut self, module: ModuleHandle, key: &str, ready_at: Tick) {
        self.0.insert((module, key.to_owned()), ready_at);
    }

    pub fn clear(&mut self, module: ModuleHandle, key: &str) -> bool {
        self.0.remove(&(module, key.to_owned())).is_some()
    }

    pub fn clear_module(&mut self, module: ModuleHandle) {
        self.0.retain(|(owner, _), _| *owner != module);
    }

    pub fn has_module(&self, module: ModuleHandle) -> bool {
        self.0.keys().any(|(owner, _)| *owner == module)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the scheduler knows about one Active module on one carrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleTrack {
    /// Level the module was last resolved at.
    pub level: u32,
    /// Modifiers this module attached, with the stat each lives on.
    pub modifiers: BTreeMap<ModifierKey, StatRef>,
}

/// `(module, level)` pairs recorded during one resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: Tick,
    pub active: Vec<(ModuleHandle, u32)>,
}

/// Scheduler bookkeeping for one carrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarrierEffectState {
    pub(crate) timers: Timers,
    pub(crate) cooldowns: Cooldowns,
    /// Presence of a track means the module was Active last pass.
    pub(crate) modules: BTreeMap<ModuleHandle, ModuleTrack>,
    pub(crate) snapshot: Option<Snapshot>,
    /// `None` until the Core's resource has been observed once.
    pub(crate) energy_depleted: Option<bool>,
}

impl CarrierEffectState {
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn track(&self, module: ModuleHandle) -> Option<&ModuleTrack> {
        self.modules.get(&module)
    }

    pub fn is_tracking(&self, module: ModuleHandle) -> bool {
        self.modules.contains_key(&module)
    }

    pub fn active_modules(&self) -> impl Iterator<Item = ModuleHandle> + '_ {
        self.modules.keys().copied()
    }

    /// Snapshot recorded at `tick`, if the carrier resolved during it.
    pub fn snapshot_at(&self, tick: Tick) -> Option<&Snapshot> {
        self.snapshot.as_ref().filter(|s| s.tick == tick)
    }

    /// Drops every timer and cooldown of `module`.
    pub(crate) fn forget_module(&mut self, module: ModuleHandle) -> Option<ModuleTrack> {
        self.timers.clear_module(module);
        self.cooldowns.clear_module(module);
        self.modules.remove(&module)
    }
}

/// Explicit world context owned by the simulation loop.
///
/// Holds every carrier's [`CarrierEffectState`]. The host passes it by
/// `&mut` into each scheduler call and tears carriers down with
/// [`EffectSession::remove_carrier`].
#[derive(Clone, Debug, Default)]
pub struct EffectSession {
    carriers: BTreeMap<EntityId, CarrierEffectState>,
}

impl EffectSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, carrier: EntityId) -> Option<&CarrierEffectState> {
        self.carriers.get(&carrier)
    }

    /// Returns the carrier's state, creating it on first use.
    pub(crate) fn state_mut(&mut self, carrier: EntityId) -> &mut CarrierEffectState {
        self.carriers.entry(carrier).or_default()
    }

    /// Forgets a carrier that disconnected or left the simulation.
    ///
    /// Only session state is dropped; the carrier itself is gone, so nothing
    /// is detached from it. Use `Scheduler::release_carrier` when the carrier
    /// stays in the world.
    pub fn remove_carrier(&mut self, carrier: EntityId) -> Option<CarrierEffectState> {
        self.carriers.remove(&carrier)
    }

    pub fn contains(&self, carrier: EntityId) -> bool {
        self.carriers.contains_key(&carrier)
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }
}
