//! Data-driven module content and loaders.
//!
//! This crate houses the content side of the effect engine:
//! - Built-in programmatic handlers
//! - Name tables resolving callbacks and handlers referenced from data
//! - Module catalogs (data-driven via RON)
//! - Engine configuration (data-driven via TOML)
//!
//! Everything here builds on `effect-core` types; loaders go through the core
//! builders so data-defined modules are validated like code-defined ones.

pub mod handlers;
pub mod tables;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use handlers::{EmergencyShieldHandler, OverclockHandler, RangedBoostHandler};
pub use tables::{CallbackTable, HandlerTable};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, EffectSpec, LoadResult, ModuleFile, ModuleLoader, ModuleSpec,
};
