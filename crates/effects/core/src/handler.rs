//! Programmatic hooks for module behavior too irregular to declare.
//!
//! A module may carry descriptors, a [`ModuleHandler`], or both. The scheduler
//! calls handler hooks after the module's descriptors resolve, inside the same
//! isolation boundary: an `Err` or a panic from any hook becomes a logged
//! `ModuleFault` and never reaches sibling modules.

use crate::combat::{DamageEvent, DamageSource};
use crate::context::ResolutionContext;
use crate::error::HookResult;
use crate::state::EntityId;

/// Integer world position of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A carrier touching, using or breaking a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInteraction {
    pub pos: BlockPos,
    /// Host block type name.
    pub block: String,
}

/// A carrier using the item in its hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemUse {
    /// Host item type name.
    pub item: String,
}

/// Hooks a module can override. Every method defaults to a no-op.
///
/// Handlers are shared by every carrier wearing the module, so per-carrier
/// state belongs in module storage or cooldowns reached through the context,
/// never in the handler itself.
pub trait ModuleHandler: Send + Sync {
    // ========================================================================
    // Ticks
    // ========================================================================

    /// Called every `tick_interval()` ticks, or once per tick when that is `0`.
    fn on_tick(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    /// Called once per `EngineConfig::second_interval` ticks.
    fn on_second_tick(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    fn tick_interval(&self) -> u32 {
        0
    }

    // ========================================================================
    // Combat, carrier attacking
    // ========================================================================

    /// May rewrite outgoing damage. Returns the new amount.
    fn on_player_attack(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _target: EntityId,
        _source: &DamageSource,
        damage: f64,
    ) -> HookResult<f64> {
        Ok(damage)
    }

    fn on_player_hit_entity(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _event: &DamageEvent,
    ) -> HookResult {
        Ok(())
    }

    fn on_player_kill_entity(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _victim: EntityId,
    ) -> HookResult {
        Ok(())
    }

    // ========================================================================
    // Combat, carrier attacked
    // ========================================================================

    /// May rewrite incoming damage after reduction. Returns the new amount.
    fn on_player_hurt(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _source: &DamageSource,
        damage: f64,
    ) -> HookResult<f64> {
        Ok(damage)
    }

    /// Returns `true` to cancel the attack before any damage is dealt.
    fn on_player_attacked(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _source: &DamageSource,
        _damage: f64,
    ) -> HookResult<bool> {
        Ok(false)
    }

    fn on_player_death(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _source: &DamageSource,
    ) -> HookResult {
        Ok(())
    }

    // ========================================================================
    // Interaction
    // ========================================================================

    fn on_right_click_block(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _block: &BlockInteraction,
    ) -> HookResult {
        Ok(())
    }

    fn on_right_click_item(&self, _ctx: &mut ResolutionContext<'_>, _item: &ItemUse) -> HookResult {
        Ok(())
    }

    fn on_left_click_block(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _block: &BlockInteraction,
    ) -> HookResult {
        Ok(())
    }

    fn on_block_break(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _block: &BlockInteraction,
    ) -> HookResult {
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn on_module_activated(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    /// Called with level `0`. When the Core itself was unequipped the
    /// context reports no resource and storage writes are dropped.
    fn on_module_deactivated(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_level_changed(
        &self,
        _ctx: &mut ResolutionContext<'_>,
        _old_level: u32,
        _new_level: u32,
    ) -> HookResult {
        Ok(())
    }

    // ========================================================================
    // Energy
    // ========================================================================

    /// Resource drained every tick while Active. If the Core cannot pay, the
    /// module is skipped for that tick.
    fn passive_energy_cost(&self) -> u32 {
        0
    }

    fn on_energy_depleted(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_energy_restored(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        Ok(())
    }

    // ========================================================================
    // Misc
    // ========================================================================

    /// Filters `on_player_hurt` and `on_player_attacked` by damage type.
    fn handles_damage_type(&self, _damage_type: &str) -> bool {
        true
    }

    fn description(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
