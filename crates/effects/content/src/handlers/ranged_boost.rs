use effect_core::{DamageSource, EntityId, HookResult, ModuleHandler, ResolutionContext};

/// Extra outgoing damage for projectile hits.
///
/// `damage × (1 + bonus_per_level × level)` when the damage type is one of
/// `damage_types`; other hits pass through untouched.
#[derive(Clone, Debug)]
pub struct RangedBoostHandler {
    pub bonus_per_level: f64,
    pub damage_types: Vec<String>,
}

impl RangedBoostHandler {
    pub const DEFAULT_BONUS_PER_LEVEL: f64 = 0.15;

    pub fn new(bonus_per_level: f64) -> Self {
        Self {
            bonus_per_level,
            ..Self::default()
        }
    }

    fn is_ranged(&self, damage_type: &str) -> bool {
        self.damage_types.iter().any(|t| t == damage_type)
    }
}

impl Default for RangedBoostHandler {
    fn default() -> Self {
        Self {
            bonus_per_level: Self::DEFAULT_BONUS_PER_LEVEL,
            damage_types: vec!["arrow".to_owned(), "projectile".to_owned()],
        }
    }
}

impl ModuleHandler for RangedBoostHandler {
    fn on_player_attack(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _target: EntityId,
        source: &DamageSource,
        damage: f64,
    ) -> HookResult<f64> {
        if !self.is_ranged(&source.damage_type) {
            return Ok(damage);
        }
        Ok(damage * (1.0 + self.bonus_per_level * f64::from(ctx.level())))
    }

    fn description(&self) -> &str {
        "Projectile hits deal extra damage per module level"
    }
}
