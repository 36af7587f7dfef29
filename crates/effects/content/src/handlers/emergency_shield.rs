use effect_core::{DamageSource, HookResult, ModuleHandler, ResolutionContext};
use tracing::debug;

const ABILITY: &str = "shield";

/// Cancels a heavy incoming attack, then recharges.
///
/// Hits of at least `min_damage` are absorbed when the shield is off cooldown
/// and the Core can pay `cost`. Each level past the first shortens the
/// cooldown by `cooldown_per_level` ticks.
#[derive(Clone, Debug)]
pub struct EmergencyShieldHandler {
    pub min_damage: f64,
    pub cost: u32,
    pub base_cooldown: u64,
    pub cooldown_per_level: u64,
}

impl EmergencyShieldHandler {
    pub fn cooldown_for_level(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_cooldown
            .saturating_sub(self.cooldown_per_level.saturating_mul(steps))
    }
}

impl Default for EmergencyShieldHandler {
    fn default() -> Self {
        Self {
            min_damage: 8.0,
            cost: 50,
            base_cooldown: 200,
            cooldown_per_level: 20,
        }
    }
}

impl ModuleHandler for EmergencyShieldHandler {
    fn on_player_attacked(
        &self,
        ctx: &mut ResolutionContext<'_>,
        source: &DamageSource,
        damage: f64,
    ) -> HookResult<bool> {
        if damage < self.min_damage {
            return Ok(false);
        }
        let cooldown = self.cooldown_for_level(ctx.level());
        let absorbed = ctx.try_use_ability(ABILITY, cooldown, self.cost);
        if absorbed {
            debug!(
                carrier = %ctx.carrier_id(),
                module = ctx.module_id(),
                damage_type = %source.damage_type,
                damage,
                cooldown,
                "shield absorbed attack"
            );
        }
        Ok(absorbed)
    }

    fn handles_damage_type(&self, damage_type: &str) -> bool {
        damage_type != "starve" && damage_type != "out_of_world"
    }

    fn description(&self) -> &str {
        "Absorbs a heavy hit, then recharges"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_shrinks_with_level_and_saturates() {
        let shield = EmergencyShieldHandler::default();
        assert_eq!(shield.cooldown_for_level(1), 200);
        assert_eq!(shield.cooldown_for_level(3), 160);
        assert_eq!(shield.cooldown_for_level(50), 0);
    }
}
