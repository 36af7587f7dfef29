use effect_core::{DamageSource, EntityId, HookResult, ModuleHandler, ResolutionContext};

const CHARGE: &str = "charge";

/// Builds charge while powered and spends it on the next hit.
///
/// Drains `drain` resource every tick. Each second adds one charge, capped
/// at `charge_per_level × level`. The next outgoing hit consumes all charge
/// for `bonus_per_charge` extra damage per point. Charge is lost when the
/// Core runs dry or the module shuts down.
#[derive(Clone, Debug)]
pub struct OverclockHandler {
    pub drain: u32,
    pub charge_per_level: i32,
    pub bonus_per_charge: f64,
}

impl OverclockHandler {
    fn max_charge(&self, level: u32) -> i32 {
        let level = i32::try_from(level).unwrap_or(i32::MAX);
        self.charge_per_level.saturating_mul(level)
    }
}

impl Default for OverclockHandler {
    fn default() -> Self {
        Self {
            drain: 2,
            charge_per_level: 5,
            bonus_per_charge: 0.02,
        }
    }
}

impl ModuleHandler for OverclockHandler {
    fn on_second_tick(&self, ctx: &mut ResolutionContext<'_>) -> HookResult {
        let cap = self.max_charge(ctx.level());
        let charge = ctx.storage_int(CHARGE, 0);
        if charge < cap {
            ctx.set_storage(CHARGE, charge + 1);
        }
        Ok(())
    }

    fn on_player_attack(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _target: EntityId,
        _source: &DamageSource,
        damage: f64,
    ) -> HookResult<f64> {
        let charge = ctx.remove_storage(CHARGE).and_then(|v| v.as_int()).unwrap_or(0);
        Ok(damage * (1.0 + self.bonus_per_charge * f64::from(charge.max(0))))
    }

    fn on_module_deactivated(&self, ctx: &mut ResolutionContext<'_>) -> HookResult {
        ctx.remove_storage(CHARGE);
        Ok(())
    }

    fn passive_energy_cost(&self) -> u32 {
        self.drain
    }

    fn on_energy_depleted(&self, ctx: &mut ResolutionContext<'_>) -> HookResult {
        ctx.remove_storage(CHARGE);
        Ok(())
    }

    fn description(&self) -> &str {
        "Stores charge over time and releases it on the next hit"
    }
}
