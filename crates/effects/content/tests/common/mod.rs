#![allow(dead_code)]

use std::collections::BTreeMap;

use effect_core::{
    ActiveStatus, AttributeModifier, Carrier, CarrierBody, Core, CoreAccess, EntityId, Loadout,
    ModifierKey, StatRef, StatusApplication, StatusRef,
};

/// Minimal carrier body keeping modifiers, statuses and vitals in maps.
#[derive(Debug, Default)]
pub struct Body {
    pub modifiers: BTreeMap<(StatRef, ModifierKey), AttributeModifier>,
    pub statuses: BTreeMap<StatusRef, ActiveStatus>,
    pub healed: f64,
    pub sustenance: i32,
}

impl CarrierBody for Body {
    fn has_modifier(&self, stat: &StatRef, key: ModifierKey) -> bool {
        self.modifiers.contains_key(&(stat.clone(), key))
    }

    fn attach_modifier(&mut self, stat: &StatRef, modifier: AttributeModifier) {
        self.modifiers.insert((stat.clone(), modifier.key), modifier);
    }

    fn remove_modifier(&mut self, stat: &StatRef, key: ModifierKey) -> bool {
        self.modifiers.remove(&(stat.clone(), key)).is_some()
    }

    fn status(&self, status: &StatusRef) -> Option<ActiveStatus> {
        self.statuses.get(status).copied()
    }

    fn apply_status(&mut self, status: &StatusRef, application: StatusApplication) {
        self.statuses.insert(
            status.clone(),
            ActiveStatus {
                amplifier: application.amplifier,
                remaining: application.duration,
            },
        );
    }

    fn heal(&mut self, amount: f64) {
        self.healed += amount;
    }

    fn restore_sustenance(&mut self, amount: i32, _saturation: f64) {
        self.sustenance += amount;
    }
}

pub struct Wearer {
    pub id: EntityId,
    pub body: Body,
    pub core: Core,
}

impl Wearer {
    pub fn new(id: u32, core: Core) -> Self {
        Self {
            id: EntityId(id),
            body: Body::default(),
            core,
        }
    }
}

impl Carrier for Wearer {
    fn id(&self) -> EntityId {
        self.id
    }

    fn loadout(&mut self) -> Loadout<'_> {
        Loadout {
            body: &mut self.body,
            core: Some(&mut self.core as &mut dyn CoreAccess),
        }
    }
}
