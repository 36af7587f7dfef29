//! Carrier contracts: what the engine needs from the agent wearing a Core.
//!
//! The host owns carriers. The engine reads and mutates them only through
//! [`Carrier`] and [`CarrierBody`].

use std::fmt;

use sha2::{Digest, Sha256};

use super::common::EntityId;
use super::core::CoreAccess;
use crate::descriptor::Operation;

/// Reference to a numeric attribute of a carrier (e.g. `attack_damage`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatRef(String);

impl StatRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for StatRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StatRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a timed status effect (e.g. `night_vision`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusRef(String);

impl StatusRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for StatusRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StatusRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StatusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic identity of a stat modifier.
///
/// Derived from `(module_id, effect_id)` with SHA-256 so that re-running
/// resolution finds the modifier it attached earlier instead of stacking a
/// second one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifierKey([u8; 16]);

impl ModifierKey {
    pub fn derive(module_id: &str, effect_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(module_id.as_bytes());
        // unit separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0x1f]);
        hasher.update(effect_id.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A modifier the engine attaches to one of a carrier's stats.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeModifier {
    pub key: ModifierKey,
    /// Human-readable source, `core:<module_id>`.
    pub name: String,
    pub amount: f64,
    pub operation: Operation,
}

/// A status effect currently running on a carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveStatus {
    pub amplifier: i32,
    /// Ticks left before the status lapses.
    pub remaining: u32,
}

/// Parameters for (re)applying a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusApplication {
    pub amplifier: i32,
    pub duration: u32,
    pub ambient: bool,
    pub show_particles: bool,
}

/// Mutable surface of a carrier: attributes, statuses and vitals.
pub trait CarrierBody {
    fn has_modifier(&self, stat: &StatRef, key: ModifierKey) -> bool;

    /// Attaches a modifier. Implementations replace any modifier with the
    /// same key on the same stat.
    fn attach_modifier(&mut self, stat: &StatRef, modifier: AttributeModifier);

    /// Removes a modifier; returns whether one was attached.
    fn remove_modifier(&mut self, stat: &StatRef, key: ModifierKey) -> bool;

    fn status(&self, status: &StatusRef) -> Option<ActiveStatus>;

    /// Applies a status, replacing any running instance of it.
    fn apply_status(&mut self, status: &StatusRef, application: StatusApplication);

    fn heal(&mut self, amount: f64);

    /// Restores the carrier's food/hunger pool.
    fn restore_sustenance(&mut self, amount: i32, saturation: f64);

    /// Deals reflected damage back to an attacker.
    fn reflect_damage(&mut self, _attacker: EntityId, _amount: f64) {}
}

/// The two halves of a carrier the engine needs at once.
///
/// Split so that the body and the Core can be borrowed mutably side by side.
pub struct Loadout<'a> {
    pub body: &'a mut dyn CarrierBody,
    pub core: Option<&'a mut dyn CoreAccess>,
}

/// A game agent that can wear a Core.
pub trait Carrier {
    fn id(&self) -> EntityId;

    /// Returns the carrier body and its equipped Core, if any.
    fn loadout(&mut self) -> Loadout<'_>;
}
