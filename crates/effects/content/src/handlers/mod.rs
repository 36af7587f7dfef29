//! Built-in programmatic module handlers.
//!
//! Handlers hold only their tuning. Anything that varies per carrier lives in
//! module storage or cooldowns reached through the resolution context.

mod emergency_shield;
mod overclock;
mod ranged_boost;

pub use emergency_shield::EmergencyShieldHandler;
pub use overclock::OverclockHandler;
pub use ranged_boost::RangedBoostHandler;
