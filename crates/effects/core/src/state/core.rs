//! The equipped Core: resource budget, installed module levels and keyed
//! storage.
//!
//! The equipment subsystem owns the Core and persists it; the engine only
//! reaches it through [`CoreAccess`]. [`Core`] is the in-memory
//! implementation hosts can embed directly.

use std::collections::BTreeMap;

/// A typed value stored in a Core's keyed storage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageValue {
    Int(i32),
    Long(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl StorageValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for StorageValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for StorageValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for StorageValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for StorageValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<bool> for StorageValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for StorageValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for StorageValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Accessors the engine uses on an equipped Core.
pub trait CoreAccess {
    /// Whether the module is installed and switched on.
    fn is_module_active(&self, module_id: &str) -> bool;

    /// Installed level of the module, `0` when not installed.
    fn module_level(&self, module_id: &str) -> u32;

    fn resource(&self) -> u32;

    fn max_resource(&self) -> u32;

    /// Deducts `amount` if available. Returns `false` without mutating
    /// anything otherwise.
    fn consume_resource(&mut self, amount: u32) -> bool;

    fn storage(&self, key: &str) -> Option<&StorageValue>;

    fn set_storage(&mut self, key: String, value: StorageValue);

    fn remove_storage(&mut self, key: &str) -> Option<StorageValue>;
}

/// Per-module installation record inside a Core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstalledModule {
    pub level: u32,
    pub enabled: bool,
}

/// State owned by one piece of capability-bearing equipment.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Core {
    resource: u32,
    max_resource: u32,
    modules: BTreeMap<String, InstalledModule>,
    storage: BTreeMap<String, StorageValue>,
}

impl Core {
    /// Creates an empty Core charged to `max_resource`.
    pub fn new(max_resource: u32) -> Self {
        Self {
            resource: max_resource,
            max_resource,
            modules: BTreeMap::new(),
            storage: BTreeMap::new(),
        }
    }

    /// Sets the current resource, clamped to the maximum (builder pattern).
    #[must_use]
    pub fn with_resource(mut self, resource: u32) -> Self {
        self.resource = resource.min(self.max_resource);
        self
    }

    /// Installs a module at `level`, enabled (builder pattern).
    #[must_use]
    pub fn with_module(mut self, module_id: &str, level: u32) -> Self {
        self.install(module_id, level);
        self
    }

    /// Installs or re-levels a module and enables it.
    pub fn install(&mut self, module_id: &str, level: u32) {
        self.modules.insert(
            module_id.to_owned(),
            InstalledModule {
                level,
                enabled: true,
            },
        );
    }

    /// Removes a module entirely.
    pub fn uninstall(&mut self, module_id: &str) -> Option<InstalledModule> {
        self.modules.remove(module_id)
    }

    /// Changes the level of an installed module. Returns false if absent.
    pub fn set_level(&mut self, module_id: &str, level: u32) -> bool {
        match self.modules.get_mut(module_id) {
            Some(installed) => {
                installed.level = level;
                true
            }
            None => false,
        }
    }

    /// Toggles an installed module without losing its level.
    pub fn set_enabled(&mut self, module_id: &str, enabled: bool) -> bool {
        match self.modules.get_mut(module_id) {
            Some(installed) => {
                installed.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Adds resource up to the maximum. Returns the amount actually stored.
    pub fn recharge(&mut self, amount: u32) -> u32 {
        let room = self.max_resource.saturating_sub(self.resource);
        let stored = amount.min(room);
        self.resource += stored;
        stored
    }

    pub fn installed(&self) -> impl Iterator<Item = (&str, &InstalledModule)> {
        self.modules.iter().map(|(id, m)| (id.as_str(), m))
    }
}

impl CoreAccess for Core {
    fn is_module_active(&self, module_id: &str) -> bool {
        self.modules
            .get(module_id)
            .is_some_and(|m| m.enabled && m.level > 0)
    }

    fn module_level(&self, module_id: &str) -> u32 {
        self.modules.get(module_id).map_or(0, |m| m.level)
    }

    fn resource(&self) -> u32 {
        self.resource
    }

    fn max_resource(&self) -> u32 {
        self.max_resource
    }

    fn consume_resource(&mut self, amount: u32) -> bool {
        if self.resource < amount {
            return false;
        }
        self.resource -= amount;
        true
    }

    fn storage(&self, key: &str) -> Option<&StorageValue> {
        self.storage.get(key)
    }

    fn set_storage(&mut self, key: String, value: StorageValue) {
        self.storage.insert(key, value);
    }

    fn remove_storage(&mut self, key: &str) -> Option<StorageValue> {
        self.storage.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_is_check_then_deduct() {
        let mut core = Core::new(100).with_resource(30);

        assert!(!core.consume_resource(31));
        assert_eq!(core.resource(), 30);

        assert!(core.consume_resource(30));
        assert_eq!(core.resource(), 0);

        // Zero-cost consumption always succeeds
        assert!(core.consume_resource(0));
    }

    #[test]
    fn disabled_or_zero_level_modules_are_inactive() {
        let mut core = Core::new(10).with_module("ALPHA", 2).with_module("BETA", 0);
        assert!(core.is_module_active("ALPHA"));
        assert!(!core.is_module_active("BETA"));
        assert!(!core.is_module_active("GAMMA"));

        core.set_enabled("ALPHA", false);
        assert!(!core.is_module_active("ALPHA"));
        assert_eq!(core.module_level("ALPHA"), 2);
    }

    #[test]
    fn recharge_stops_at_maximum() {
        let mut core = Core::new(50).with_resource(45);
        assert_eq!(core.recharge(20), 5);
        assert_eq!(core.resource(), 50);
    }

    #[test]
    fn recharge_over_maximum_stores_nothing() {
        // Reachable through deserialized state
        let mut core = Core {
            resource: 80,
            ..Core::new(50)
        };
        assert_eq!(core.recharge(10), 0);
        assert_eq!(core.resource(), 80);
    }

    #[test]
    fn long_reads_accept_int_values() {
        assert_eq!(StorageValue::Int(7).as_long(), Some(7));
        assert_eq!(StorageValue::Bool(true).as_long(), None);
    }
}
