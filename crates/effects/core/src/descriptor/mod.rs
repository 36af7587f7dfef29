//! Declarative effect descriptors.
//!
//! An [`EffectDescriptor`] describes one behavior a module grants its
//! carrier. Descriptors are built once through the per-kind builders in
//! [`builder`], never mutated afterwards, and shared between every carrier
//! wearing the module.
//!
//! Every level-dependent magnitude follows the same law:
//!
//! ```text
//! value(level) = base + per_level × (level − 1)
//! ```

pub mod builder;
mod callback;

pub use builder::{
    CallbackBuilder, DamageBoostBuilder, DamageReductionBuilder, DamageReflectionBuilder,
    HealingBuilder, ResourceRestoreBuilder, StatModifierBuilder, StatusEffectBuilder,
};
pub use callback::{CallbackFn, EffectCallback};

use bitflags::bitflags;

use crate::state::{StatRef, StatusRef};

/// How a stat modifier combines with the carrier's base attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Added to the base value.
    Add,
    /// Summed with other percentages, then applied once.
    AddPercent,
    /// Applied as a sequential multiplier.
    #[default]
    Multiply,
}

/// Linear level scaling: `base + per_level × (level − 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling {
    pub base: f64,
    pub per_level: f64,
}

impl Scaling {
    pub const fn new(base: f64, per_level: f64) -> Self {
        Self { base, per_level }
    }

    /// Value at `level`. Level 1 yields `base`.
    pub fn at(&self, level: u32) -> f64 {
        self.base + self.per_level * (f64::from(level) - 1.0)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.base.is_finite() && self.per_level.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatModifierParams {
    pub stat: StatRef,
    pub value: Scaling,
    pub operation: Operation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusParams {
    pub status: StatusRef,
    /// Duration in ticks of each application.
    pub duration: u32,
    pub base_amplifier: i32,
    pub amplifier_per_level: i32,
    pub ambient: bool,
    pub show_particles: bool,
}

impl StatusParams {
    pub fn amplifier_for_level(&self, level: u32) -> i32 {
        let steps = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
        self.base_amplifier
            .saturating_add(self.amplifier_per_level.saturating_mul(steps))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealingParams {
    pub amount: Scaling,
}

/// Sustenance (food) restoration; integral amounts plus a saturation factor.
#[derive(Clone, Debug, PartialEq)]
pub struct RestoreParams {
    pub amount: i32,
    pub per_level: i32,
    pub saturation: f64,
}

impl RestoreParams {
    pub fn amount_for_level(&self, level: u32) -> i32 {
        let steps = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
        self.amount.saturating_add(self.per_level.saturating_mul(steps))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoostParams {
    /// Outgoing damage multiplier; `1.0` means no boost.
    pub multiplier: Scaling,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReductionParams {
    /// Fraction of incoming damage removed.
    pub fraction: Scaling,
    /// Damage types this reduction applies to; empty means all.
    pub damage_types: Vec<String>,
}

impl ReductionParams {
    pub fn applies_to(&self, damage_type: &str) -> bool {
        self.damage_types.is_empty() || self.damage_types.iter().any(|t| t == damage_type)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectionParams {
    /// Fraction of post-reduction damage sent back to the attacker.
    pub fraction: Scaling,
}

/// The behavior a descriptor grants.
#[derive(Clone, Debug, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    // ========================================================================
    // Persistent (kept attached while the module is active)
    // ========================================================================
    StatModifier(StatModifierParams),
    StatusEffect(StatusParams),

    // ========================================================================
    // Periodic (interval and resource gated)
    // ========================================================================
    Healing(HealingParams),
    ResourceRestore(RestoreParams),
    PeriodicCallback(EffectCallback),

    // ========================================================================
    // Combat (aggregated when a damage event resolves)
    // ========================================================================
    DamageBoost(BoostParams),
    OnHit(EffectCallback),
    DamageReduction(ReductionParams),
    DamageReflection(ReflectionParams),
    OnHurt(EffectCallback),
}

bitflags! {
    /// Which resolution phases a set of effects participates in.
    ///
    /// Computed once per module at build time so combat aggregation can
    /// skip modules that contribute nothing to the event at hand.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectMask: u16 {
        const STAT_MODIFIER = 1 << 0;
        const STATUS = 1 << 1;
        const PERIODIC = 1 << 2;
        const OUTGOING = 1 << 3;
        const INCOMING = 1 << 4;
    }
}

impl EffectKind {
    pub fn mask(&self) -> EffectMask {
        match self {
            Self::StatModifier(_) => EffectMask::STAT_MODIFIER,
            Self::StatusEffect(_) => EffectMask::STATUS,
            Self::Healing(_) | Self::ResourceRestore(_) | Self::PeriodicCallback(_) => {
                EffectMask::PERIODIC
            }
            Self::DamageBoost(_) | Self::OnHit(_) => EffectMask::OUTGOING,
            Self::DamageReduction(_) | Self::DamageReflection(_) | Self::OnHurt(_) => {
                EffectMask::INCOMING
            }
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// One declarative behavior unit of a module.
#[derive(Clone, Debug)]
pub struct EffectDescriptor {
    effect_id: String,
    kind: EffectKind,
    /// Ticks between firings for periodic kinds.
    interval: u32,
    /// Resource consumed each time the effect fires; `0` means free.
    resource_cost: u32,
}

impl EffectDescriptor {
    pub(crate) fn from_parts(
        effect_id: String,
        kind: EffectKind,
        interval: u32,
        resource_cost: u32,
    ) -> Self {
        Self {
            effect_id,
            kind,
            interval,
            resource_cost,
        }
    }

    // ========== builders ==========

    pub fn stat_modifier(stat: impl Into<StatRef>) -> StatModifierBuilder {
        StatModifierBuilder::new(stat.into())
    }

    pub fn status_effect(status: impl Into<StatusRef>) -> StatusEffectBuilder {
        StatusEffectBuilder::new(status.into())
    }

    pub fn healing() -> HealingBuilder {
        HealingBuilder::new()
    }

    pub fn resource_restore() -> ResourceRestoreBuilder {
        ResourceRestoreBuilder::new()
    }

    pub fn damage_boost() -> DamageBoostBuilder {
        DamageBoostBuilder::new()
    }

    pub fn damage_reduction() -> DamageReductionBuilder {
        DamageReductionBuilder::new()
    }

    pub fn damage_reflection() -> DamageReflectionBuilder {
        DamageReflectionBuilder::new()
    }

    pub fn periodic_callback(callback: EffectCallback) -> CallbackBuilder {
        CallbackBuilder::periodic(callback)
    }

    pub fn on_hit_callback(callback: EffectCallback) -> CallbackBuilder {
        CallbackBuilder::on_hit(callback)
    }

    pub fn on_hurt_callback(callback: EffectCallback) -> CallbackBuilder {
        CallbackBuilder::on_hurt(callback)
    }

    // ========== accessors ==========

    pub fn effect_id(&self) -> &str {
        &self.effect_id
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn resource_cost(&self) -> u32 {
        self.resource_cost
    }

    pub fn requires_resource(&self) -> bool {
        self.resource_cost > 0
    }

    /// Level-scaled magnitude of this effect.
    ///
    /// Stat modifier value, heal amount, sustenance amount, boost multiplier,
    /// reduction fraction, reflection fraction or status amplifier depending
    /// on the kind. Callbacks have no magnitude and yield `0.0`.
    pub fn value_for_level(&self, level: u32) -> f64 {
        match &self.kind {
            EffectKind::StatModifier(p) => p.value.at(level),
            EffectKind::StatusEffect(p) => f64::from(p.amplifier_for_level(level)),
            EffectKind::Healing(p) => p.amount.at(level),
            EffectKind::ResourceRestore(p) => f64::from(p.amount_for_level(level)),
            EffectKind::DamageBoost(p) => p.multiplier.at(level),
            EffectKind::DamageReduction(p) => p.fraction.at(level),
            EffectKind::DamageReflection(p) => p.fraction.at(level),
            EffectKind::PeriodicCallback(_) | EffectKind::OnHit(_) | EffectKind::OnHurt(_) => 0.0,
        }
    }

    /// Status amplifier at `level`; `0` for non-status kinds.
    pub fn amplifier_for_level(&self, level: u32) -> i32 {
        match &self.kind {
            EffectKind::StatusEffect(p) => p.amplifier_for_level(level),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_level_one_is_base() {
        let scaling = Scaling::new(1.0, 0.5);
        assert_eq!(scaling.at(1), 1.0);
        // 1.0 + 0.5 × (3 − 1) = 2.0
        assert_eq!(scaling.at(3), 2.0);
    }

    #[test]
    fn scaling_is_monotonic_for_non_negative_slope() {
        for per_level in [0.0, 0.05, 0.25, 3.0] {
            let scaling = Scaling::new(0.1, per_level);
            let mut previous = scaling.at(1);
            for level in 2..=32 {
                let current = scaling.at(level);
                assert!(current >= previous, "per_level={per_level} level={level}");
                previous = current;
            }
        }
    }

    #[test]
    fn status_amplifier_scales_per_level() {
        let params = StatusParams {
            status: StatusRef::new("speed"),
            duration: 100,
            base_amplifier: 0,
            amplifier_per_level: 1,
            ambient: true,
            show_particles: false,
        };
        assert_eq!(params.amplifier_for_level(1), 0);
        assert_eq!(params.amplifier_for_level(4), 3);
    }

    #[test]
    fn empty_filter_matches_every_damage_type() {
        let all = ReductionParams {
            fraction: Scaling::new(0.1, 0.0),
            damage_types: Vec::new(),
        };
        let fire_only = ReductionParams {
            fraction: Scaling::new(0.1, 0.0),
            damage_types: vec!["fire".into()],
        };
        assert!(all.applies_to("magic"));
        assert!(fire_only.applies_to("fire"));
        assert!(!fire_only.applies_to("fall"));
    }

    #[test]
    fn operation_parses_snake_case() {
        assert_eq!("add_percent".parse::<Operation>(), Ok(Operation::AddPercent));
        assert_eq!(Operation::Multiply.to_string(), "multiply");
    }
}
