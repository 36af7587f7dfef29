//! Combat aggregation and handler event fan-out.
//!
//! Every entry point here is called synchronously by the host while it
//! resolves the event, nested inside the tick that produced it. Contributions
//! come from the `(module, level)` snapshot of the same tick.

use tracing::{debug, trace};

use super::Scheduler;
use super::isolation::Pass;
use crate::combat::{
    AttackCheck, DamageEvent, DamageSource, IncomingDamage, OutgoingDamage, cap_reduction,
    reflected_damage, stack_boosts,
};
use crate::context::ResolutionContext;
use crate::descriptor::{EffectDescriptor, EffectKind, EffectMask};
use crate::error::{FaultPhase, HookResult, ModuleFault};
use crate::handler::{BlockInteraction, ItemUse, ModuleHandler};
use crate::module::{ModuleDefinition, ModuleHandle, ModuleRegistry};
use crate::state::{Carrier, CoreAccess, EffectSession, EntityId, Loadout, Tick};

impl<R: ModuleRegistry> Scheduler<R> {
    /// Aggregates an outgoing hit by `attacker` against `target`.
    ///
    /// 1. `multiplier = 1 + Σ(boost − 1)` over Active boost descriptors
    /// 2. handlers' `on_player_attack` rewrite the amount, chained in module order
    /// 3. per module: on-hit callbacks (each resource gated), then
    ///    `on_player_hit_entity`
    pub fn on_outgoing_damage<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        attacker: &mut C,
        tick: Tick,
        target: EntityId,
        source: &DamageSource,
        raw: f64,
    ) -> OutgoingDamage {
        let carrier = attacker.id();
        let Loadout { body, core } = attacker.loadout();
        let Some(core) = core else {
            return OutgoingDamage::unchanged(raw);
        };
        let state = session.state_mut(carrier);
        let active = self.active_modules(state, &*core, tick);
        let mut outcome = OutgoingDamage::unchanged(raw);

        let mut boosts = Vec::new();
        for (definition, level) in self.contributors(&active, EffectMask::OUTGOING) {
            for effect in definition.effects() {
                if let EffectKind::DamageBoost(params) = effect.kind() {
                    boosts.push(params.multiplier.at(level));
                }
            }
        }
        let multiplier = stack_boosts(boosts);
        let mut amount = raw * multiplier;

        let mut pass = Pass {
            carrier,
            tick,
            body,
            core,
            faults: &mut outcome.faults,
        };

        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            let Some(handler) = definition.handler() else {
                continue;
            };
            let current = amount;
            if let Some(rewritten) = pass.run(
                definition,
                handle,
                level,
                &mut state.cooldowns,
                FaultPhase::Attack,
                |ctx| handler.on_player_attack(ctx, target, source, current),
            ) {
                amount = rewritten;
            }
        }

        let event = DamageEvent {
            source: source.clone(),
            target,
            amount,
        };
        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            // Handler-only modules still get `on_player_hit_entity`
            let effects: &[EffectDescriptor] = if definition.contributes(EffectMask::OUTGOING) {
                definition.effects()
            } else {
                &[]
            };
            for effect in effects {
                if let EffectKind::OnHit(callback) = effect.kind() {
                    if !pay_for(pass.core, effect) {
                        continue;
                    }
                    pass.run(
                        definition,
                        handle,
                        level,
                        &mut state.cooldowns,
                        FaultPhase::Attack,
                        |ctx| callback.invoke(ctx, Some(&event)),
                    );
                }
            }
            if let Some(handler) = definition.handler() {
                pass.run(
                    definition,
                    handle,
                    level,
                    &mut state.cooldowns,
                    FaultPhase::Attack,
                    |ctx| handler.on_player_hit_entity(ctx, &event),
                );
            }
        }

        trace!(%carrier, %target, raw, multiplier, amount, "outgoing damage aggregated");
        outcome.multiplier = multiplier;
        outcome.amount = amount;
        outcome
    }

    /// Lets handlers cancel an incoming attack before damage is computed.
    ///
    /// The first handler answering `true` wins; later handlers are not asked.
    pub fn on_incoming_attack<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        defender: &mut C,
        tick: Tick,
        source: &DamageSource,
        raw: f64,
    ) -> AttackCheck {
        let carrier = defender.id();
        let Loadout { body, core } = defender.loadout();
        let Some(core) = core else {
            return AttackCheck::default();
        };
        let state = session.state_mut(carrier);
        let active = self.active_modules(state, &*core, tick);
        let mut check = AttackCheck::default();
        let mut pass = Pass {
            carrier,
            tick,
            body,
            core,
            faults: &mut check.faults,
        };

        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            let Some(handler) = definition.handler() else {
                continue;
            };
            if !handler.handles_damage_type(&source.damage_type) {
                continue;
            }
            let cancelled = pass.run(
                definition,
                handle,
                level,
                &mut state.cooldowns,
                FaultPhase::Attacked,
                |ctx| handler.on_player_attacked(ctx, source, raw),
            );
            if cancelled == Some(true) {
                debug!(
                    %carrier,
                    module = definition.id(),
                    damage_type = %source.damage_type,
                    "attack cancelled"
                );
                check.cancelled_by = Some(definition.id().to_owned());
                break;
            }
        }
        check
    }

    /// Aggregates an incoming hit on `defender`.
    ///
    /// 1. `reduction = clamp(Σ fraction, 0, cap)` over Active reduction
    ///    descriptors whose filter is empty or names the damage type
    /// 2. `after = raw × (1 − reduction)`; handlers' `on_player_hurt` rewrite
    ///    the amount, chained in module order
    /// 3. per module: on-hurt callbacks (each resource gated)
    /// 4. `reflected = after × Σ reflection`, sent to the attacker if any
    pub fn on_incoming_damage<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        defender: &mut C,
        tick: Tick,
        source: &DamageSource,
        raw: f64,
    ) -> IncomingDamage {
        let carrier = defender.id();
        let Loadout { body, core } = defender.loadout();
        let Some(core) = core else {
            return IncomingDamage::unchanged(raw);
        };
        let state = session.state_mut(carrier);
        let active = self.active_modules(state, &*core, tick);
        let mut outcome = IncomingDamage::unchanged(raw);

        let mut reduction_sum = 0.0;
        let mut reflection = Vec::new();
        for (definition, level) in self.contributors(&active, EffectMask::INCOMING) {
            for effect in definition.effects() {
                match effect.kind() {
                    EffectKind::DamageReduction(params)
                        if params.applies_to(&source.damage_type) =>
                    {
                        reduction_sum += params.fraction.at(level);
                    }
                    EffectKind::DamageReflection(params) => {
                        reflection.push(params.fraction.at(level));
                    }
                    _ => {}
                }
            }
        }
        let reduction = cap_reduction(reduction_sum, self.reduction_cap());
        let after_reduction = raw * (1.0 - reduction);
        let mut amount = after_reduction;

        let mut pass = Pass {
            carrier,
            tick,
            body,
            core,
            faults: &mut outcome.faults,
        };

        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            let Some(handler) = definition.handler() else {
                continue;
            };
            if !handler.handles_damage_type(&source.damage_type) {
                continue;
            }
            let current = amount;
            if let Some(rewritten) = pass.run(
                definition,
                handle,
                level,
                &mut state.cooldowns,
                FaultPhase::Hurt,
                |ctx| handler.on_player_hurt(ctx, source, current),
            ) {
                amount = rewritten;
            }
        }

        let event = DamageEvent {
            source: source.clone(),
            target: carrier,
            amount,
        };
        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            if !definition.contributes(EffectMask::INCOMING) {
                continue;
            }
            for effect in definition.effects() {
                if let EffectKind::OnHurt(callback) = effect.kind() {
                    if !pay_for(pass.core, effect) {
                        continue;
                    }
                    pass.run(
                        definition,
                        handle,
                        level,
                        &mut state.cooldowns,
                        FaultPhase::Hurt,
                        |ctx| callback.invoke(ctx, Some(&event)),
                    );
                }
            }
        }

        let reflected = match source.attacker {
            Some(attacker) => {
                let reflected = reflected_damage(after_reduction, reflection);
                if reflected > 0.0 {
                    pass.body.reflect_damage(attacker, reflected);
                }
                reflected
            }
            None => 0.0,
        };

        trace!(%carrier, raw, reduction, amount, reflected, "incoming damage aggregated");
        outcome.reduction = reduction;
        outcome.amount = amount;
        outcome.reflected = reflected;
        outcome
    }

    // ========================================================================
    // Handler event fan-out
    // ========================================================================

    pub fn on_kill<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        victim: EntityId,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Kill, |handler, ctx| {
            handler.on_player_kill_entity(ctx, victim)
        })
    }

    pub fn on_death<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        source: &DamageSource,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Death, |handler, ctx| {
            handler.on_player_death(ctx, source)
        })
    }

    pub fn on_right_click_block<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        block: &BlockInteraction,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Interact, |handler, ctx| {
            handler.on_right_click_block(ctx, block)
        })
    }

    pub fn on_right_click_item<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        item: &ItemUse,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Interact, |handler, ctx| {
            handler.on_right_click_item(ctx, item)
        })
    }

    pub fn on_left_click_block<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        block: &BlockInteraction,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Interact, |handler, ctx| {
            handler.on_left_click_block(ctx, block)
        })
    }

    pub fn on_block_break<C: Carrier + ?Sized>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        block: &BlockInteraction,
    ) -> Vec<ModuleFault> {
        self.dispatch(session, carrier, tick, FaultPhase::Interact, |handler, ctx| {
            handler.on_block_break(ctx, block)
        })
    }

    /// Calls `hook` on the handler of every Active module, in module order.
    fn dispatch<C, F>(
        &self,
        session: &mut EffectSession,
        carrier: &mut C,
        tick: Tick,
        phase: FaultPhase,
        mut hook: F,
    ) -> Vec<ModuleFault>
    where
        C: Carrier + ?Sized,
        F: FnMut(&dyn ModuleHandler, &mut ResolutionContext<'_>) -> HookResult,
    {
        let carrier_id = carrier.id();
        let Loadout { body, core } = carrier.loadout();
        let Some(core) = core else {
            return Vec::new();
        };
        let state = session.state_mut(carrier_id);
        let active = self.active_modules(state, &*core, tick);
        let mut faults = Vec::new();
        let mut pass = Pass {
            carrier: carrier_id,
            tick,
            body,
            core,
            faults: &mut faults,
        };

        for &(handle, level) in &active {
            let Some(definition) = self.registry.definition(handle) else {
                continue;
            };
            let Some(handler) = definition.handler() else {
                continue;
            };
            pass.run(definition, handle, level, &mut state.cooldowns, phase, |ctx| {
                hook(handler, ctx)
            });
        }
        faults
    }

    /// Definitions and levels of the Active modules in `active` whose
    /// descriptors take part in `phase`.
    fn contributors<'s>(
        &'s self,
        active: &'s [(ModuleHandle, u32)],
        phase: EffectMask,
    ) -> impl Iterator<Item = (&'s ModuleDefinition, u32)> + 's {
        active.iter().filter_map(move |&(handle, level)| {
            self.registry
                .definition(handle)
                .filter(|definition| definition.contributes(phase))
                .map(|definition| (definition.as_ref(), level))
        })
    }
}

/// Resource gate for combat callbacks.
fn pay_for(core: &mut dyn CoreAccess, effect: &EffectDescriptor) -> bool {
    if !effect.requires_resource() || core.consume_resource(effect.resource_cost()) {
        return true;
    }
    trace!(effect = effect.effect_id(), cost = effect.resource_cost(), "combat callback starved");
    false
}
