//! Per-step resolution and the Inactive ↔ Active lifecycle.

use tracing::{debug, trace};

use super::isolation::{DetachedCore, Pass};
use super::{Scheduler, StepReport};
use crate::descriptor::{EffectDescriptor, EffectKind, StatModifierParams, StatusParams};
use crate::error::FaultPhase;
use crate::module::{ModuleDefinition, ModuleHandle, ModuleRegistry};
use crate::state::{
    AttributeModifier, Carrier, CarrierBody, CarrierEffectState, Cooldowns, CoreAccess,
    EffectSession, EntityId, Loadout, ModifierKey, ModuleTrack, Snapshot, StatusApplication,
    Tick, TimerKey, Timers,
};

#[derive(Clone, Copy, Debug, Default)]
struct ModuleOutcome {
    activated: bool,
    starved: bool,
}

impl<R: ModuleRegistry> Scheduler<R> {
    /// Resolves every carrier for `tick`.
    ///
    /// Carriers without an equipped Core have their effects torn down and
    /// their session state dropped.
    pub fn step<'c, C>(
        &self,
        session: &mut EffectSession,
        tick: Tick,
        carriers: impl IntoIterator<Item = &'c mut C>,
    ) -> StepReport
    where
        C: Carrier + ?Sized + 'c,
    {
        let mut report = StepReport::new(tick);
        for carrier in carriers {
            self.resolve_into(session, carrier, tick, &mut report);
        }
        if !report.is_clean() {
            debug!(%tick, faults = report.faults.len(), "step finished with module faults");
        }
        report
    }

    /// Resolves a single carrier for `tick`.
    pub fn resolve_carrier<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
    ) -> StepReport {
        let mut report = StepReport::new(tick);
        self.resolve_into(session, carrier, tick, &mut report);
        report
    }

    /// Detaches every effect from a carrier that stays in the world, then
    /// forgets its session state.
    pub fn release_carrier<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
    ) -> StepReport {
        let mut report = StepReport::new(tick);
        let carrier_id = carrier.id();
        let Some(state) = session.remove_carrier(carrier_id) else {
            return report;
        };

        let Loadout { body, core } = carrier.loadout();
        let mut detached = DetachedCore;
        let core: &mut dyn CoreAccess = match core {
            Some(core) => core,
            None => &mut detached,
        };
        self.teardown(carrier_id, tick, body, core, state, &mut report);
        report
    }

    fn resolve_into<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        report: &mut StepReport,
    ) {
        let carrier_id = carrier.id();
        let Loadout { body, core } = carrier.loadout();

        let Some(core) = core else {
            if let Some(state) = session.remove_carrier(carrier_id) {
                debug!(carrier = %carrier_id, %tick, "core unequipped, releasing carrier");
                let mut detached = DetachedCore;
                self.teardown(carrier_id, tick, body, &mut detached, state, report);
            }
            return;
        };

        report.carriers += 1;
        let state = session.state_mut(carrier_id);
        let mut pass = Pass {
            carrier: carrier_id,
            tick,
            body,
            core,
            faults: &mut report.faults,
        };
        let mut active = Vec::new();
        let mut drain_unpaid = false;

        for (handle, definition) in self.handles() {
            let level = pass.core.module_level(definition.id());
            let is_active = pass.core.is_module_active(definition.id()) && level > 0;

            if !is_active {
                if let Some(track) = state.modules.get(&handle) {
                    deactivate(&mut pass, &mut state.cooldowns, definition, handle, track);
                    state.forget_module(handle);
                    report.deactivated += 1;
                }
                continue;
            }

            active.push((handle, level));
            let outcome = self.resolve_module(&mut pass, state, definition, handle, level);
            report.activated += usize::from(outcome.activated);
            report.starved += usize::from(outcome.starved);
            drain_unpaid |= outcome.starved;
        }

        // Energy edges, seen once all modules had their chance to spend. A
        // Core that cannot pay a passive drain counts as depleted.
        let depleted = drain_unpaid || pass.core.resource() == 0;
        let previous = state.energy_depleted.replace(depleted);
        if previous.is_some_and(|was| was != depleted) {
            debug!(carrier = %carrier_id, %tick, depleted, "core energy edge");
            for &(handle, level) in &active {
                let Some(definition) = self.registry.definition(handle) else {
                    continue;
                };
                let Some(handler) = definition.handler() else {
                    continue;
                };
                pass.run(
                    definition,
                    handle,
                    level,
                    &mut state.cooldowns,
                    FaultPhase::Energy,
                    |ctx| {
                        if depleted {
                            handler.on_energy_depleted(ctx)
                        } else {
                            handler.on_energy_restored(ctx)
                        }
                    },
                );
            }
        }

        state.snapshot = Some(Snapshot { tick, active });
    }

    fn resolve_module(
        &self,
        pass: &mut Pass<'_>,
        state: &mut CarrierEffectState,
        definition: &ModuleDefinition,
        handle: ModuleHandle,
        level: u32,
    ) -> ModuleOutcome {
        let CarrierEffectState {
            timers,
            cooldowns,
            modules,
            ..
        } = state;
        let handler = definition.handler();
        let mut outcome = ModuleOutcome::default();

        // 1. Inactive → Active
        let previous = modules.get(&handle).map(|track| track.level);
        if previous.is_none() {
            modules.insert(
                handle,
                ModuleTrack {
                    level,
                    ..ModuleTrack::default()
                },
            );
            outcome.activated = true;
            debug!(carrier = %pass.carrier, module = definition.id(), level, "module activated");
            if let Some(handler) = handler {
                pass.run(definition, handle, level, cooldowns, FaultPhase::Activate, |ctx| {
                    handler.on_module_activated(ctx)
                });
            }
        }

        // 2. Passive drain
        if let Some(handler) = handler {
            let drain = handler.passive_energy_cost();
            if drain > 0 && !pass.core.consume_resource(drain) {
                trace!(
                    carrier = %pass.carrier,
                    module = definition.id(),
                    drain,
                    "passive drain unpaid, module skipped"
                );
                outcome.starved = true;
                return outcome;
            }
        }

        // 3. Level change while Active
        let level_changed = previous.is_some_and(|old| old != level);
        if let (Some(old), true) = (previous, level_changed) {
            debug!(
                carrier = %pass.carrier,
                module = definition.id(),
                old,
                new = level,
                "module level changed"
            );
            if let Some(handler) = handler {
                pass.run(definition, handle, level, cooldowns, FaultPhase::LevelChange, |ctx| {
                    handler.on_level_changed(ctx, old, level)
                });
            }
        }

        // 4. Descriptors, in declaration order
        let refresh = level_changed || previous.is_none();
        let tick = pass.tick;
        let track = modules.entry(handle).or_default();
        for (index, effect) in definition.effects().iter().enumerate() {
            let key = TimerKey::effect(handle, index);
            match effect.kind() {
                EffectKind::StatModifier(params) => {
                    pass.guarded(definition.id(), FaultPhase::Tick, |body, _| {
                        sync_modifier(body, track, definition.id(), effect, params, level, refresh);
                    });
                }
                EffectKind::StatusEffect(params) => {
                    let window = self.config.status_refresh_window;
                    pass.guarded(definition.id(), FaultPhase::Tick, |body, _| {
                        refresh_status(body, params, level, window);
                    });
                }
                EffectKind::Healing(params) => {
                    pass.guarded(definition.id(), FaultPhase::Tick, |body, core| {
                        if periodic_gate(timers, core, key, tick, effect) {
                            body.heal(params.amount.at(level));
                        }
                    });
                }
                EffectKind::ResourceRestore(params) => {
                    pass.guarded(definition.id(), FaultPhase::Tick, |body, core| {
                        if periodic_gate(timers, core, key, tick, effect) {
                            body.restore_sustenance(
                                params.amount_for_level(level),
                                params.saturation,
                            );
                        }
                    });
                }
                EffectKind::PeriodicCallback(callback) => {
                    let due = periodic_gate(timers, pass.core, key, tick, effect);
                    if due {
                        pass.run(definition, handle, level, cooldowns, FaultPhase::Tick, |ctx| {
                            callback.invoke(ctx, None)
                        });
                    }
                }
                // Aggregated when a damage event arrives
                EffectKind::DamageBoost(_)
                | EffectKind::OnHit(_)
                | EffectKind::DamageReduction(_)
                | EffectKind::DamageReflection(_)
                | EffectKind::OnHurt(_) => {}
            }
        }
        track.level = level;

        // 5. Handler ticks
        if let Some(handler) = handler {
            let interval = handler.tick_interval();
            if timers.should_trigger(TimerKey::handler_tick(handle), pass.tick, interval) {
                pass.run(definition, handle, level, cooldowns, FaultPhase::Tick, |ctx| {
                    handler.on_tick(ctx)
                });
            }
            if timers.should_trigger(
                TimerKey::second_tick(handle),
                pass.tick,
                self.config.second_interval,
            ) {
                pass.run(definition, handle, level, cooldowns, FaultPhase::Tick, |ctx| {
                    handler.on_second_tick(ctx)
                });
            }
        }

        outcome
    }

    /// Deactivates every tracked module of a carrier and records it.
    fn teardown(
        &self,
        carrier: EntityId,
        tick: Tick,
        body: &mut dyn CarrierBody,
        core: &mut dyn CoreAccess,
        mut state: CarrierEffectState,
        report: &mut StepReport,
    ) {
        let mut pass = Pass {
            carrier,
            tick,
            body,
            core,
            faults: &mut report.faults,
        };
        let tracks = std::mem::take(&mut state.modules);
        for (handle, track) in &tracks {
            match self.registry.definition(*handle) {
                Some(definition) => {
                    deactivate(&mut pass, &mut state.cooldowns, definition, *handle, track);
                }
                None => detach_tracked(pass.body, track),
            }
        }
        report.deactivated += tracks.len();
    }
}

/// Active → Inactive: detach modifiers, then notify the handler at level 0.
fn deactivate(
    pass: &mut Pass<'_>,
    cooldowns: &mut Cooldowns,
    definition: &ModuleDefinition,
    handle: ModuleHandle,
    track: &ModuleTrack,
) {
    pass.guarded(definition.id(), FaultPhase::Deactivate, |body, _| {
        detach_tracked(&mut *body, track);
        // Sweep keys the track may have missed (e.g. state rebuilt mid-session)
        for effect in definition.effects() {
            if let EffectKind::StatModifier(params) = effect.kind() {
                let key = ModifierKey::derive(definition.id(), effect.effect_id());
                if !track.modifiers.contains_key(&key) {
                    body.remove_modifier(&params.stat, key);
                }
            }
        }
    });

    if let Some(handler) = definition.handler() {
        pass.run(definition, handle, 0, cooldowns, FaultPhase::Deactivate, |ctx| {
            handler.on_module_deactivated(ctx)
        });
    }
    debug!(
        carrier = %pass.carrier,
        module = definition.id(),
        modifiers = track.modifiers.len(),
        "module deactivated"
    );
}

fn detach_tracked(body: &mut dyn CarrierBody, track: &ModuleTrack) {
    for (key, stat) in &track.modifiers {
        body.remove_modifier(stat, *key);
    }
}

/// Attaches the modifier if absent; remove-then-reattach when `refresh`.
fn sync_modifier(
    body: &mut dyn CarrierBody,
    track: &mut ModuleTrack,
    module_id: &str,
    effect: &EffectDescriptor,
    params: &StatModifierParams,
    level: u32,
    refresh: bool,
) {
    let key = ModifierKey::derive(module_id, effect.effect_id());
    let attached = body.has_modifier(&params.stat, key);
    if attached && !refresh {
        track
            .modifiers
            .entry(key)
            .or_insert_with(|| params.stat.clone());
        return;
    }
    if attached {
        body.remove_modifier(&params.stat, key);
    }

    let amount = params.value.at(level);
    body.attach_modifier(
        &params.stat,
        AttributeModifier {
            key,
            name: format!("core:{module_id}"),
            amount,
            operation: params.operation,
        },
    );
    track.modifiers.insert(key, params.stat.clone());
    debug!(
        module = module_id,
        effect = effect.effect_id(),
        stat = %params.stat,
        amount,
        refreshed = attached,
        "modifier attached"
    );
}

/// Reapplies a status when absent, at another amplifier, or about to lapse.
fn refresh_status(body: &mut dyn CarrierBody, params: &StatusParams, level: u32, window: u32) {
    let amplifier = params.amplifier_for_level(level);
    let due = body
        .status(&params.status)
        .is_none_or(|active| active.amplifier != amplifier || active.remaining <= window);
    if !due {
        return;
    }

    body.apply_status(
        &params.status,
        StatusApplication {
            amplifier,
            duration: params.duration,
            ambient: params.ambient,
            show_particles: params.show_particles,
        },
    );
    trace!(status = %params.status, amplifier, "status refreshed");
}

/// Interval gate, then resource gate. The timer is consumed even when the
/// resource gate refuses, so a starved effect retries on its next interval.
fn periodic_gate(
    timers: &mut Timers,
    core: &mut dyn CoreAccess,
    key: TimerKey,
    tick: Tick,
    effect: &EffectDescriptor,
) -> bool {
    if !timers.should_trigger(key, tick, effect.interval()) {
        return false;
    }
    if effect.requires_resource() && !core.consume_resource(effect.resource_cost()) {
        trace!(
            effect = effect.effect_id(),
            cost = effect.resource_cost(),
            %tick,
            "periodic effect starved"
        );
        return false;
    }
    trace!(
        effect = effect.effect_id(),
        kind = effect.kind().name(),
        %tick,
        "periodic effect fired"
    );
    true
}
