//! Outcomes of combat aggregation.

use crate::error::ModuleFault;

/// Result of aggregating an outgoing hit.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingDamage {
    /// Damage the host reported.
    pub raw: f64,
    /// Stacked boost multiplier.
    pub multiplier: f64,
    /// Damage to deal, after boosts and handler rewrites.
    pub amount: f64,
    pub faults: Vec<ModuleFault>,
}

impl OutgoingDamage {
    /// Outcome when no module contributes.
    pub fn unchanged(raw: f64) -> Self {
        Self {
            raw,
            multiplier: 1.0,
            amount: raw,
            faults: Vec::new(),
        }
    }
}

/// Result of aggregating an incoming hit.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomingDamage {
    pub raw: f64,
    /// Capped reduction fraction that was applied.
    pub reduction: f64,
    /// Damage to take, after reduction and handler rewrites.
    pub amount: f64,
    /// Damage sent back to the attacker (zero without an attacker).
    pub reflected: f64,
    pub faults: Vec<ModuleFault>,
}

impl IncomingDamage {
    pub fn unchanged(raw: f64) -> Self {
        Self {
            raw,
            reduction: 0.0,
            amount: raw,
            reflected: 0.0,
            faults: Vec::new(),
        }
    }
}

/// Result of the pre-damage check that lets handlers cancel an attack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackCheck {
    /// Module that cancelled the attack, if any.
    pub cancelled_by: Option<String>,
    pub faults: Vec<ModuleFault>,
}

impl AttackCheck {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_by.is_some()
    }
}
