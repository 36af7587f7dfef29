//! Module effect resolution engine.
//!
//! `effect-core` lets independently defined capability modules attach passive
//! behavior to a carrier through a single piece of equipment (the Core):
//! stat modifiers, status effects, periodic healing and sustenance, combat
//! damage boosts, reductions and reflections, and custom callbacks. Every
//! simulation step the [`Scheduler`] resolves the Active modules of each
//! carrier, gated by the Core's resource budget and per-module cooldowns.
//!
//! The engine is single-threaded and step-synchronous. It owns no world
//! state: the host supplies carriers and Cores through the [`Carrier`],
//! [`CarrierBody`] and [`CoreAccess`] traits and keeps an [`EffectSession`]
//! alive across steps.
pub mod combat;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod module;
pub mod scheduler;
pub mod state;

pub use combat::{AttackCheck, DamageEvent, DamageSource, IncomingDamage, OutgoingDamage};
pub use config::EngineConfig;
pub use context::{ModuleScope, ResolutionContext};
pub use descriptor::{
    EffectCallback, EffectDescriptor, EffectKind, EffectMask, Operation, Scaling,
};
pub use error::{
    ConfigurationError, EngineError, ErrorSeverity, FaultPhase, HookError, HookResult,
    ModuleFault,
};
pub use handler::{BlockInteraction, BlockPos, ItemUse, ModuleHandler};
pub use module::{
    Category, ModuleBuilder, ModuleCatalog, ModuleDefinition, ModuleHandle, ModuleRegistry,
};
pub use scheduler::{Scheduler, StepReport};
pub use state::{
    ActiveStatus, AttributeModifier, Carrier, CarrierBody, CarrierEffectState, Core, CoreAccess,
    EffectSession, EntityId, Loadout, ModifierKey, StatRef, StatusApplication, StatusRef,
    StorageValue, Tick,
};
