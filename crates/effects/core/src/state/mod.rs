//! State the engine reads and mutates.
//!
//! The [`Core`] and the carrier are owned by the host and reached only through
//! [`CoreAccess`], [`Carrier`] and [`CarrierBody`]. [`EffectSession`] is the
//! engine's own per-session bookkeeping and is never persisted.
mod carrier;
mod common;
mod core;
mod session;

pub use carrier::{
    ActiveStatus, AttributeModifier, Carrier, CarrierBody, Loadout, ModifierKey, StatRef,
    StatusApplication, StatusRef,
};
pub use common::{EntityId, Tick};
pub use self::core::{Core, CoreAccess, InstalledModule, StorageValue};
pub use session::{
    CarrierEffectState, Cooldowns, EffectSession, ModuleTrack, Snapshot, TimerKey, TimerSlot,
    Timers,
};
