//! Per-module isolation boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::context::{ModuleScope, ResolutionContext};
use crate::error::{FaultPhase, HookError, HookResult, ModuleFault};
use crate::module::{ModuleDefinition, ModuleHandle};
use crate::state::{CarrierBody, Cooldowns, CoreAccess, EntityId, StorageValue, Tick};

/// Runs module code, turning an `Err` or a panic into a recorded fault.
pub(crate) fn isolate<T>(
    faults: &mut Vec<ModuleFault>,
    carrier: EntityId,
    module: &str,
    phase: FaultPhase,
    tick: Tick,
    hook: impl FnOnce() -> HookResult<T>,
) -> Option<T> {
    let error = match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(error)) => error,
        Err(payload) => HookError::Panicked(panic_message(payload.as_ref())),
    };

    warn!(%carrier, module, %phase, %tick, %error, "module hook failed");
    faults.push(ModuleFault {
        module: module.to_owned(),
        phase,
        error,
    });
    None
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Everything one pass over a carrier borrows at once.
pub(crate) struct Pass<'p> {
    pub carrier: EntityId,
    pub tick: Tick,
    pub body: &'p mut dyn CarrierBody,
    pub core: &'p mut dyn CoreAccess,
    pub faults: &'p mut Vec<ModuleFault>,
}

impl Pass<'_> {
    /// Builds a context for `definition` and runs `hook` inside the boundary.
    pub fn run<T>(
        &mut self,
        definition: &ModuleDefinition,
        handle: ModuleHandle,
        level: u32,
        cooldowns: &mut Cooldowns,
        phase: FaultPhase,
        hook: impl FnOnce(&mut ResolutionContext<'_>) -> HookResult<T>,
    ) -> Option<T> {
        let scope = ModuleScope {
            carrier: self.carrier,
            module_id: definition.id(),
            handle,
            level,
            tick: self.tick,
        };
        let mut ctx = ResolutionContext::new(scope, &mut *self.body, &mut *self.core, cooldowns);
        isolate(
            self.faults,
            self.carrier,
            definition.id(),
            phase,
            self.tick,
            || hook(&mut ctx),
        )
    }

    /// Runs descriptor work for `module` inside the boundary. Descriptors
    /// reach the host directly, without a context.
    pub fn guarded(
        &mut self,
        module: &str,
        phase: FaultPhase,
        work: impl FnOnce(&mut dyn CarrierBody, &mut dyn CoreAccess),
    ) {
        let Self {
            carrier,
            tick,
            body,
            core,
            faults,
        } = self;
        isolate(faults, *carrier, module, phase, *tick, || {
            work(&mut **body, &mut **core);
            Ok(())
        });
    }
}

/// Stand-in Core for hooks that run after the real one was unequipped.
///
/// Reports no resource, refuses every consumption and drops storage writes.
pub(crate) struct DetachedCore;

impl CoreAccess for DetachedCore {
    fn is_module_active(&self, _module_id: &str) -> bool {
        false
    }

    fn module_level(&self, _module_id: &str) -> u32 {
        0
    }

    fn resource(&self) -> u32 {
        0
    }

    fn max_resource(&self) -> u32 {
        0
    }

    fn consume_resource(&mut self, amount: u32) -> bool {
        amount == 0
    }

    fn storage(&self, _key: &str) -> Option<&StorageValue> {
        None
    }

    fn set_storage(&mut self, _key: String, _value: StorageValue) {}

    fn remove_storage(&mut self, _key: &str) -> Option<StorageValue> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_become_faults() {
        let mut faults = Vec::new();
        let out: Option<()> = isolate(
            &mut faults,
            EntityId(1),
            "ALPHA",
            FaultPhase::Tick,
            Tick(3),
            || Err(HookError::failed("no target")),
        );
        assert!(out.is_none());
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].error, HookError::Failed("no target".into()));
    }

    #[test]
    fn panics_become_faults() {
        let mut faults = Vec::new();
        let out: Option<u32> = isolate(
            &mut faults,
            EntityId(1),
            "ALPHA",
            FaultPhase::Hurt,
            Tick(3),
            || panic!("overflow in {}", "ALPHA"),
        );
        assert!(out.is_none());
        assert_eq!(faults[0].error, HookError::Panicked("overflow in ALPHA".into()));
        assert_eq!(faults[0].phase, FaultPhase::Hurt);
    }

    #[test]
    fn success_passes_value_through() {
        let mut faults = Vec::new();
        let out = isolate(
            &mut faults,
            EntityId(1),
            "ALPHA",
            FaultPhase::Attack,
            Tick(3),
            || Ok(4.5),
        );
        assert_eq!(out, Some(4.5));
        assert!(faults.is_empty());
    }

    #[test]
    fn detached_core_refuses_spending() {
        let mut core = DetachedCore;
        assert!(!core.consume_resource(1));
        assert!(core.consume_resource(0));
        core.set_storage("ALPHA:x".into(), 1.into());
        assert!(core.storage("ALPHA:x").is_none());
    }
}
