use std::fmt;
use std::sync::Arc;

use crate::combat::DamageEvent;
use crate::context::ResolutionContext;
use crate::error::HookResult;

/// Signature shared by periodic, on-hit and on-hurt callbacks.
///
/// Periodic callbacks receive `None`; combat callbacks receive the damage
/// event that triggered them.
pub type CallbackFn =
    dyn Fn(&mut ResolutionContext<'_>, Option<&DamageEvent>) -> HookResult + Send + Sync;

/// A named, shareable effect callback.
#[derive(Clone)]
pub struct EffectCallback {
    name: Arc<str>,
    func: Arc<CallbackFn>,
}

impl EffectCallback {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&mut ResolutionContext<'_>, Option<&DamageEvent>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(
        &self,
        ctx: &mut ResolutionContext<'_>,
        event: Option<&DamageEvent>,
    ) -> HookResult {
        (self.func)(ctx, event)
    }
}

impl fmt::Debug for EffectCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectCallback").field(&self.name).finish()
    }
}
