//! Fluent builders, one per effect kind.
//!
//! Builders are pure data construction. Validation happens in `build()`, so a
//! malformed descriptor is rejected before its module can be registered.

use super::{
    BoostParams, EffectCallback, EffectDescriptor, EffectKind, HealingParams, Operation,
    ReductionParams, ReflectionParams, RestoreParams, Scaling, StatModifierParams, StatusParams,
};
use crate::error::ConfigurationError;
use crate::state::{StatRef, StatusRef};

/// Firing interval of periodic kinds unless overridden (one second at 20 tps).
pub const DEFAULT_INTERVAL: u32 = 20;

/// Status duration unless overridden.
pub const DEFAULT_STATUS_DURATION: u32 = 100;

/// Fields every builder shares.
#[derive(Clone, Debug, Default)]
struct Common {
    effect_id: Option<String>,
    interval: u32,
    resource_cost: u32,
}

impl Common {
    fn periodic() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            ..Self::default()
        }
    }

    fn id_or(&self, default: impl FnOnce() -> String) -> String {
        self.effect_id.clone().unwrap_or_else(default)
    }

    fn finish(self, effect_id: String, kind: EffectKind) -> EffectDescriptor {
        EffectDescriptor::from_parts(effect_id, kind, self.interval, self.resource_cost)
    }
}

fn ensure_finite(effect: &str, field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinite {
            effect: effect.to_owned(),
            field,
        })
    }
}

fn ensure_scaling(effect: &str, scaling: &Scaling) -> Result<(), ConfigurationError> {
    if scaling.is_finite() {
        return Ok(());
    }
    ensure_finite(effect, "base_value", scaling.base)?;
    ensure_finite(effect, "per_level", scaling.per_level)
}

// ============================================================================
// Persistent kinds
// ============================================================================

#[derive(Clone, Debug)]
pub struct StatModifierBuilder {
    common: Common,
    stat: StatRef,
    value: Scaling,
    operation: Operation,
}

impl StatModifierBuilder {
    pub(super) fn new(stat: StatRef) -> Self {
        Self {
            common: Common::default(),
            stat,
            value: Scaling::new(0.0, 0.0),
            operation: Operation::default(),
        }
    }

    pub fn base_value(mut self, value: f64) -> Self {
        self.value.base = value;
        self
    }

    pub fn per_level(mut self, value: f64) -> Self {
        self.value.per_level = value;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| format!("attr_{}", self.stat));
        if self.stat.is_blank() {
            return Err(ConfigurationError::MissingStat { effect: effect_id });
        }
        ensure_scaling(&effect_id, &self.value)?;

        let kind = EffectKind::StatModifier(StatModifierParams {
            stat: self.stat,
            value: self.value,
            operation: self.operation,
        });
        Ok(self.common.finish(effect_id, kind))
    }
}

#[derive(Clone, Debug)]
pub struct StatusEffectBuilder {
    common: Common,
    params: StatusParams,
}

impl StatusEffectBuilder {
    pub(super) fn new(status: StatusRef) -> Self {
        Self {
            common: Common::default(),
            params: StatusParams {
                status,
                duration: DEFAULT_STATUS_DURATION,
                base_amplifier: 0,
                amplifier_per_level: 1,
                ambient: true,
                show_particles: false,
            },
        }
    }

    pub fn duration(mut self, ticks: u32) -> Self {
        self.params.duration = ticks;
        self
    }

    /// Amplifier at level 1.
    pub fn amplifier(mut self, amplifier: i32) -> Self {
        self.params.base_amplifier = amplifier;
        self
    }

    pub fn amplifier_per_level(mut self, step: i32) -> Self {
        self.params.amplifier_per_level = step;
        self
    }

    pub fn ambient(mut self, ambient: bool) -> Self {
        self.params.ambient = ambient;
        self
    }

    pub fn show_particles(mut self, show: bool) -> Self {
        self.params.show_particles = show;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| format!("status_{}", self.params.status));
        if self.params.status.is_blank() {
            return Err(ConfigurationError::MissingStatus { effect: effect_id });
        }
        Ok(self
            .common
            .finish(effect_id, EffectKind::StatusEffect(self.params)))
    }
}

// ============================================================================
// Periodic kinds
// ============================================================================

#[derive(Clone, Debug)]
pub struct HealingBuilder {
    common: Common,
    amount: Scaling,
}

impl HealingBuilder {
    pub(super) fn new() -> Self {
        Self {
            common: Common::periodic(),
            amount: Scaling::new(0.5, 0.5),
        }
    }

    pub fn base_value(mut self, amount: f64) -> Self {
        self.amount.base = amount;
        self
    }

    pub fn per_level(mut self, amount: f64) -> Self {
        self.amount.per_level = amount;
        self
    }

    pub fn interval(mut self, ticks: u32) -> Self {
        self.common.interval = ticks;
        self
    }

    pub fn resource_cost(mut self, cost: u32) -> Self {
        self.common.resource_cost = cost;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| "healing".to_owned());
        ensure_scaling(&effect_id, &self.amount)?;
        let kind = EffectKind::Healing(HealingParams {
            amount: self.amount,
        });
        Ok(self.common.finish(effect_id, kind))
    }
}

#[derive(Clone, Debug)]
pub struct ResourceRestoreBuilder {
    common: Common,
    params: RestoreParams,
}

impl ResourceRestoreBuilder {
    pub(super) fn new() -> Self {
        Self {
            common: Common::periodic(),
            params: RestoreParams {
                amount: 1,
                per_level: 0,
                saturation: 0.5,
            },
        }
    }

    pub fn amount(mut self, amount: i32) -> Self {
        self.params.amount = amount;
        self
    }

    pub fn per_level(mut self, amount: i32) -> Self {
        self.params.per_level = amount;
        self
    }

    pub fn saturation(mut self, saturation: f64) -> Self {
        self.params.saturation = saturation;
        self
    }

    pub fn interval(mut self, ticks: u32) -> Self {
        self.common.interval = ticks;
        self
    }

    pub fn resource_cost(mut self, cost: u32) -> Self {
        self.common.resource_cost = cost;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| "restore".to_owned());
        ensure_finite(&effect_id, "saturation", self.params.saturation)?;
        Ok(self
            .common
            .finish(effect_id, EffectKind::ResourceRestore(self.params)))
    }
}

// ============================================================================
// Combat kinds
// ============================================================================

#[derive(Clone, Debug)]
pub struct DamageBoostBuilder {
    common: Common,
    multiplier: Scaling,
}

impl DamageBoostBuilder {
    pub(super) fn new() -> Self {
        Self {
            common: Common::default(),
            multiplier: Scaling::new(1.0, 0.0),
        }
    }

    /// Multiplier at level 1; `1.2` means +20%.
    pub fn base_value(mut self, multiplier: f64) -> Self {
        self.multiplier.base = multiplier;
        self
    }

    pub fn per_level(mut self, step: f64) -> Self {
        self.multiplier.per_level = step;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| "damage_boost".to_owned());
        ensure_scaling(&effect_id, &self.multiplier)?;
        let kind = EffectKind::DamageBoost(BoostParams {
            multiplier: self.multiplier,
        });
        Ok(self.common.finish(effect_id, kind))
    }
}

#[derive(Clone, Debug)]
pub struct DamageReductionBuilder {
    common: Common,
    fraction: Scaling,
    damage_types: Vec<String>,
}

impl DamageReductionBuilder {
    pub(super) fn new() -> Self {
        Self {
            common: Common::default(),
            fraction: Scaling::new(0.0, 0.0),
            damage_types: Vec::new(),
        }
    }

    /// Fraction removed at level 1; `0.1` means 10%.
    pub fn base_value(mut self, fraction: f64) -> Self {
        self.fraction.base = fraction;
        self
    }

    pub fn per_level(mut self, step: f64) -> Self {
        self.fraction.per_level = step;
        self
    }

    /// Restricts the reduction to these damage types. Empty means all.
    pub fn damage_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.damage_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| "damage_reduction".to_owned());
        ensure_scaling(&effect_id, &self.fraction)?;
        let kind = EffectKind::DamageReduction(ReductionParams {
            fraction: self.fraction,
            damage_types: self.damage_types,
        });
        Ok(self.common.finish(effect_id, kind))
    }
}

#[derive(Clone, Debug)]
pub struct DamageReflectionBuilder {
    common: Common,
    fraction: Scaling,
}

impl DamageReflectionBuilder {
    pub(super) fn new() -> Self {
        Self {
            common: Common::default(),
            fraction: Scaling::new(0.0, 0.0),
        }
    }

    pub fn base_value(mut self, fraction: f64) -> Self {
        self.fraction.base = fraction;
        self
    }

    pub fn per_level(mut self, step: f64) -> Self {
        self.fraction.per_level = step;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let effect_id = self.common.id_or(|| "damage_reflection".to_owned());
        ensure_scaling(&effect_id, &self.fraction)?;
        let kind = EffectKind::DamageReflection(ReflectionParams {
            fraction: self.fraction,
        });
        Ok(self.common.finish(effect_id, kind))
    }
}

// ============================================================================
// Callback kinds
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    Periodic,
    OnHit,
    OnHurt,
}

/// Builder shared by the three callback kinds.
#[derive(Clone, Debug)]
pub struct CallbackBuilder {
    common: Common,
    trigger: Trigger,
    callback: EffectCallback,
}

impl CallbackBuilder {
    pub(super) fn periodic(callback: EffectCallback) -> Self {
        Self {
            common: Common::periodic(),
            trigger: Trigger::Periodic,
            callback,
        }
    }

    pub(super) fn on_hit(callback: EffectCallback) -> Self {
        Self {
            common: Common::default(),
            trigger: Trigger::OnHit,
            callback,
        }
    }

    pub(super) fn on_hurt(callback: EffectCallback) -> Self {
        Self {
            common: Common::default(),
            trigger: Trigger::OnHurt,
            callback,
        }
    }

    /// Ticks between firings; only meaningful for periodic callbacks.
    pub fn interval(mut self, ticks: u32) -> Self {
        self.common.interval = ticks;
        self
    }

    pub fn resource_cost(mut self, cost: u32) -> Self {
        self.common.resource_cost = cost;
        self
    }

    pub fn effect_id(mut self, id: impl Into<String>) -> Self {
        self.common.effect_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<EffectDescriptor, ConfigurationError> {
        let name = self.callback.name().to_owned();
        let (prefix, kind) = match self.trigger {
            Trigger::Periodic => ("periodic", EffectKind::PeriodicCallback(self.callback)),
            Trigger::OnHit => ("on_hit", EffectKind::OnHit(self.callback)),
            Trigger::OnHurt => ("on_hurt", EffectKind::OnHurt(self.callback)),
        };
        let effect_id = self.common.id_or(|| format!("{prefix}_{name}"));
        Ok(self.common.finish(effect_id, kind))
    }
}
