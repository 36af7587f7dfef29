//! Shared fixture carrier for scheduler integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use effect_core::{
    ActiveStatus, AttributeModifier, Carrier, CarrierBody, Core, CoreAccess, EntityId, Loadout,
    ModifierKey, StatRef, StatusApplication, StatusRef,
};

/// Records everything the engine does to a carrier.
#[derive(Debug, Default)]
pub struct Body {
    pub modifiers: BTreeMap<(String, ModifierKey), AttributeModifier>,
    pub statuses: BTreeMap<String, ActiveStatus>,
    pub status_applications: usize,
    pub healed: f64,
    pub sustenance: i32,
    pub saturation: f64,
    pub reflected: Vec<(EntityId, f64)>,
    /// Makes `heal` panic, standing in for a broken host.
    pub heal_panics: bool,
}

impl Body {
    /// Modifiers currently attached to `stat`.
    pub fn modifiers_on(&self, stat: &str) -> Vec<&AttributeModifier> {
        self.modifiers
            .iter()
            .filter(|((s, _), _)| s == stat)
            .map(|(_, m)| m)
            .collect()
    }

    /// Counts statuses down as the host world would between steps.
    pub fn age_statuses(&mut self, ticks: u32) {
        for status in self.statuses.values_mut() {
            status.remaining = status.remaining.saturating_sub(ticks);
        }
        self.statuses.retain(|_, s| s.remaining > 0);
    }
}

impl CarrierBody for Body {
    fn has_modifier(&self, stat: &StatRef, key: ModifierKey) -> bool {
        self.modifiers.contains_key(&(stat.as_str().to_owned(), key))
    }

    fn attach_modifier(&mut self, stat: &StatRef, modifier: AttributeModifier) {
        self.modifiers
            .insert((stat.as_str().to_owned(), modifier.key), modifier);
    }

    fn remove_modifier(&mut self, stat: &StatRef, key: ModifierKey) -> bool {
        self.modifiers
            .remove(&(stat.as_str().to_owned(), key))
            .is_some()
    }

    fn status(&self, status: &StatusRef) -> Option<ActiveStatus> {
        self.statuses.get(status.as_str()).copied()
    }

    fn apply_status(&mut self, status: &StatusRef, application: StatusApplication) {
        self.status_applications += 1;
        self.statuses.insert(
            status.as_str().to_owned(),
            ActiveStatus {
                amplifier: application.amplifier,
                remaining: application.duration,
            },
        );
    }

    fn heal(&mut self, amount: f64) {
        assert!(!self.heal_panics, "host refused to heal");
        self.healed += amount;
    }

    fn restore_sustenance(&mut self, amount: i32, saturation: f64) {
        self.sustenance += amount;
        self.saturation += saturation;
    }

    fn reflect_damage(&mut self, attacker: EntityId, amount: f64) {
        self.reflected.push((attacker, amount));
    }
}

#[derive(Debug)]
pub struct TestCarrier {
    pub id: EntityId,
    pub body: Body,
    pub core: Option<Core>,
}

impl TestCarrier {
    pub fn new(id: u32, core: Core) -> Self {
        Self {
            id: EntityId(id),
            body: Body::default(),
            core: Some(core),
        }
    }

    pub fn bare(id: u32) -> Self {
        Self {
            id: EntityId(id),
            body: Body::default(),
            core: None,
        }
    }

    pub fn core(&self) -> &Core {
        self.core.as_ref().expect("carrier has no core")
    }

    pub fn core_mut(&mut self) -> &mut Core {
        self.core.as_mut().expect("carrier has no core")
    }

    pub fn resource(&self) -> u32 {
        self.core().resource()
    }

    pub fn stored(&self, key: &str) -> Option<effect_core::StorageValue> {
        self.core().storage(key).cloned()
    }
}

impl Carrier for TestCarrier {
    fn id(&self) -> EntityId {
        self.id
    }

    fn loadout(&mut self) -> Loadout<'_> {
        Loadout {
            body: &mut self.body,
            core: self.core.as_mut().map(|c| c as &mut dyn CoreAccess),
        }
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
