//! Per-(carrier, module, step) façade handed to callbacks and handler hooks.
//!
//! A [`ResolutionContext`] borrows the carrier body, its Core and the
//! carrier's cooldown book for exactly one module invocation. Storage keys
//! and cooldowns are scoped to that module, so two modules using the same
//! key never collide.

use crate::module::ModuleHandle;
use crate::state::{CarrierBody, Cooldowns, CoreAccess, EntityId, StorageValue, Tick};

/// Identifies whose behalf a context acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleScope<'a> {
    pub carrier: EntityId,
    pub module_id: &'a str,
    pub handle: ModuleHandle,
    pub level: u32,
    pub tick: Tick,
}

/// Accessors available to module code during resolution.
pub struct ResolutionContext<'a> {
    scope: ModuleScope<'a>,
    body: &'a mut dyn CarrierBody,
    core: &'a mut dyn CoreAccess,
    cooldowns: &'a mut Cooldowns,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        scope: ModuleScope<'a>,
        body: &'a mut dyn CarrierBody,
        core: &'a mut dyn CoreAccess,
        cooldowns: &'a mut Cooldowns,
    ) -> Self {
        Self {
            scope,
            body,
            core,
            cooldowns,
        }
    }

    // ========== scope ==========

    pub fn carrier_id(&self) -> EntityId {
        self.scope.carrier
    }

    pub fn module_id(&self) -> &str {
        self.scope.module_id
    }

    /// Level of the module; `0` during deactivation.
    pub fn level(&self) -> u32 {
        self.scope.level
    }

    pub fn tick(&self) -> Tick {
        self.scope.tick
    }

    pub fn carrier(&self) -> &dyn CarrierBody {
        &*self.body
    }

    pub fn carrier_mut(&mut self) -> &mut dyn CarrierBody {
        &mut *self.body
    }

    // ========== resource ==========

    /// Deducts `amount` if the Core holds it. On `false` nothing changed.
    pub fn consume_resource(&mut self, amount: u32) -> bool {
        self.core.consume_resource(amount)
    }

    pub fn resource(&self) -> u32 {
        self.core.resource()
    }

    pub fn max_resource(&self) -> u32 {
        self.core.max_resource()
    }

    /// Current resource as a fraction of the maximum, in `[0, 1]`.
    pub fn resource_percent(&self) -> f64 {
        match self.core.max_resource() {
            0 => 0.0,
            max => f64::from(self.core.resource()) / f64::from(max),
        }
    }

    pub fn has_resource(&self, amount: u32) -> bool {
        self.core.resource() >= amount
    }

    // ========== storage ==========

    fn storage_key(&self, key: &str) -> String {
        format!("{}:{key}", self.scope.module_id)
    }

    fn stored(&self, key: &str) -> Option<&StorageValue> {
        self.core.storage(&self.storage_key(key))
    }

    pub fn set_storage(&mut self, key: &str, value: impl Into<StorageValue>) {
        let key = self.storage_key(key);
        self.core.set_storage(key, value.into());
    }

    pub fn storage_int(&self, key: &str, default: i32) -> i32 {
        self.stored(key).and_then(StorageValue::as_int).unwrap_or(default)
    }

    pub fn storage_long(&self, key: &str, default: i64) -> i64 {
        self.stored(key).and_then(StorageValue::as_long).unwrap_or(default)
    }

    pub fn storage_float(&self, key: &str, default: f64) -> f64 {
        self.stored(key).and_then(StorageValue::as_float).unwrap_or(default)
    }

    pub fn storage_bool(&self, key: &str, default: bool) -> bool {
        self.stored(key).and_then(StorageValue::as_bool).unwrap_or(default)
    }

    pub fn storage_text(&self, key: &str, default: &str) -> String {
        self.stored(key)
            .and_then(StorageValue::as_text)
            .unwrap_or(default)
            .to_owned()
    }

    pub fn has_storage(&self, key: &str) -> bool {
        self.stored(key).is_some()
    }

    pub fn remove_storage(&mut self, key: &str) -> Option<StorageValue> {
        let key = self.storage_key(key);
        self.core.remove_storage(&key)
    }

    // ========== cooldowns ==========

    /// Puts `key` on cooldown for `steps` ticks from now.
    pub fn set_cooldown(&mut self, key: &str, steps: u64) {
        self.cooldowns
            .set(self.scope.handle, key, self.scope.tick + steps);
    }

    /// Ticks until `key` is ready again; `0` when ready.
    pub fn cooldown_remaining(&self, key: &str) -> u64 {
        self.cooldowns
            .ready_at(self.scope.handle, key)
            .map_or(0, |ready| ready.since(self.scope.tick))
    }

    pub fn is_on_cooldown(&self, key: &str) -> bool {
        self.cooldown_remaining(key) > 0
    }

    pub fn clear_cooldown(&mut self, key: &str) {
        self.cooldowns.clear(self.scope.handle, key);
    }

    /// Uses an ability if it is off cooldown and affordable.
    ///
    /// On success the resource is consumed and the cooldown started. On
    /// failure nothing changes.
    pub fn try_use_ability(&mut self, key: &str, cooldown: u64, cost: u32) -> bool {
        if self.is_on_cooldown(key) || !self.has_resource(cost) {
            return false;
        }
        if !self.consume_resource(cost) {
            return false;
        }
        self.set_cooldown(key, cooldown);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        ActiveStatus, AttributeModifier, Core, ModifierKey, StatRef, StatusApplication, StatusRef,
    };

    #[derive(Default)]
    struct NullBody;

    impl CarrierBody for NullBody {
        fn has_modifier(&self, _: &StatRef, _: ModifierKey) -> bool {
            false
        }
        fn attach_modifier(&mut self, _: &StatRef, _: AttributeModifier) {}
        fn remove_modifier(&mut self, _: &StatRef, _: ModifierKey) -> bool {
            false
        }
        fn status(&self, _: &StatusRef) -> Option<ActiveStatus> {
            None
        }
        fn apply_status(&mut self, _: &StatusRef, _: StatusApplication) {}
        fn heal(&mut self, _: f64) {}
        fn restore_sustenance(&mut self, _: i32, _: f64) {}
    }

    fn scope(module_id: &str, handle: u16, tick: u64) -> ModuleScope<'_> {
        ModuleScope {
            carrier: EntityId(1),
            module_id,
            handle: ModuleHandle::new(handle),
            level: 1,
            tick: Tick(tick),
        }
    }

    #[test]
    fn storage_is_namespaced_per_module() {
        let mut body = NullBody;
        let mut core = Core::new(100);
        let mut cooldowns = Cooldowns::default();

        {
            let mut ctx =
                ResolutionContext::new(scope("ALPHA", 0, 1), &mut body, &mut core, &mut cooldowns);
            ctx.set_storage("charge", 3);
        }
        {
            let mut ctx =
                ResolutionContext::new(scope("BETA", 1, 1), &mut body, &mut core, &mut cooldowns);
            assert!(!ctx.has_storage("charge"));
            ctx.set_storage("charge", 9);
            assert_eq!(ctx.storage_int("charge", 0), 9);
        }

        assert_eq!(core.storage("ALPHA:charge"), Some(&StorageValue::Int(3)));
        assert_eq!(core.storage("BETA:charge"), Some(&StorageValue::Int(9)));
    }

    #[test]
    fn typed_getters_fall_back_to_default() {
        let mut body = NullBody;
        let mut core = Core::new(10);
        let mut cooldowns = Cooldowns::default();
        let mut ctx =
            ResolutionContext::new(scope("ALPHA", 0, 1), &mut body, &mut core, &mut cooldowns);

        ctx.set_storage("mode", "burst");
        assert_eq!(ctx.storage_text("mode", "idle"), "burst");
        // Wrong type reads as the default
        assert_eq!(ctx.storage_float("mode", 0.5), 0.5);
        assert!(ctx.storage_bool("missing", true));

        assert_eq!(ctx.remove_storage("mode"), Some(StorageValue::Text("burst".into())));
        assert!(!ctx.has_storage("mode"));
    }

    #[test]
    fn cooldowns_count_down_in_ticks() {
        let mut body = NullBody;
        let mut core = Core::new(10);
        let mut cooldowns = Cooldowns::default();

        {
            let mut ctx =
                ResolutionContext::new(scope("ALPHA", 0, 100), &mut body, &mut core, &mut cooldowns);
            ctx.set_cooldown("dash", 40);
            assert_eq!(ctx.cooldown_remaining("dash"), 40);
        }
        {
            let ctx =
                ResolutionContext::new(scope("ALPHA", 0, 130), &mut body, &mut core, &mut cooldowns);
            assert_eq!(ctx.cooldown_remaining("dash"), 10);
            assert!(ctx.is_on_cooldown("dash"));
        }
        {
            let mut ctx =
                ResolutionContext::new(scope("ALPHA", 0, 140), &mut body, &mut core, &mut cooldowns);
            assert!(!ctx.is_on_cooldown("dash"));
            ctx.set_cooldown("dash", 5);
            ctx.clear_cooldown("dash");
            assert_eq!(ctx.cooldown_remaining("dash"), 0);
        }
    }

    #[test]
    fn try_use_ability_is_all_or_nothing() {
        let mut body = NullBody;
        let mut core = Core::new(100).with_resource(30);
        let mut cooldowns = Cooldowns::default();
        let mut ctx =
            ResolutionContext::new(scope("SHIELD", 0, 10), &mut body, &mut core, &mut cooldowns);

        // Too expensive: no cooldown started, no resource spent
        assert!(!ctx.try_use_ability("guard", 60, 31));
        assert_eq!(ctx.resource(), 30);
        assert!(!ctx.is_on_cooldown("guard"));

        assert!(ctx.try_use_ability("guard", 60, 20));
        assert_eq!(ctx.resource(), 10);
        assert_eq!(ctx.cooldown_remaining("guard"), 60);

        // On cooldown: nothing spent even though it is affordable
        assert!(!ctx.try_use_ability("guard", 60, 5));
        assert_eq!(ctx.resource(), 10);
    }

    #[test]
    fn resource_percent_handles_empty_core() {
        let mut body = NullBody;
        let mut core = Core::new(0);
        let mut cooldowns = Cooldowns::default();
        let ctx = ResolutionContext::new(scope("ALPHA", 0, 1), &mut body, &mut core, &mut cooldowns);
        assert_eq!(ctx.resource_percent(), 0.0);
    }
}
