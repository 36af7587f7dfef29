//! Combat event types and the pure damage math the scheduler aggregates with.
//!
//! # Architecture
//!
//! - **Pure Functions**: [`stack_boosts`], [`cap_reduction`] and
//!   [`reflected_damage`] are side-effect free
//! - **Used by the Scheduler**: `Scheduler::on_outgoing_damage` and
//!   `Scheduler::on_incoming_damage` feed them the contributions of every
//!   Active module
//! - **Outcome types**: [`OutgoingDamage`], [`IncomingDamage`] and
//!   [`AttackCheck`] report what happened, including isolated module faults

pub mod damage;
pub mod result;

pub use damage::{cap_reduction, reflected_damage, stack_boosts};
pub use result::{AttackCheck, IncomingDamage, OutgoingDamage};

use crate::state::EntityId;

/// Where a hit came from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSource {
    /// Host damage type name (`"player"`, `"arrow"`, `"fire"`, ...).
    pub damage_type: String,
    /// Entity responsible for the hit, if any.
    pub attacker: Option<EntityId>,
}

impl DamageSource {
    pub fn new(damage_type: impl Into<String>) -> Self {
        Self {
            damage_type: damage_type.into(),
            attacker: None,
        }
    }

    #[must_use]
    pub fn with_attacker(mut self, attacker: EntityId) -> Self {
        self.attacker = Some(attacker);
        self
    }
}

/// A resolved hit, handed to on-hit and on-hurt callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageEvent {
    pub source: DamageSource,
    /// The entity taking the damage.
    pub target: EntityId,
    /// Damage after module aggregation.
    pub amount: f64,
}
