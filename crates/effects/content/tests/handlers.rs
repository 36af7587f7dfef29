//! Built-in handlers driven through the scheduler with the baseline catalog.

mod common;

use common::Wearer;
use effect_content::ModuleLoader;
use effect_core::{Core, CoreAccess, DamageSource, EffectSession, EntityId, Scheduler, Tick};

fn scheduler() -> Scheduler {
    Scheduler::new(ModuleLoader::builtin_catalog().unwrap())
}

#[test]
fn ranged_amplifier_boosts_only_projectiles() {
    let scheduler = scheduler();
    let mut session = EffectSession::new();
    let mut archer = Wearer::new(1, Core::new(0).with_module("ranged_amplifier", 2));
    scheduler.step(&mut session, Tick(1), [&mut archer]);

    let arrow = scheduler.on_outgoing_damage(
        &mut session,
        &mut archer,
        Tick(1),
        EntityId(2),
        &DamageSource::new("arrow"),
        10.0,
    );
    let melee = scheduler.on_outgoing_damage(
        &mut session,
        &mut archer,
        Tick(1),
        EntityId(2),
        &DamageSource::new("player"),
        10.0,
    );

    // 10 × (1 + 0.15 × 2)
    assert!((arrow.amount - 13.0).abs() < 1e-9, "{}", arrow.amount);
    assert_eq!(melee.amount, 10.0);
}

#[test]
fn emergency_shield_absorbs_heavy_hits_then_recharges() {
    let scheduler = scheduler();
    let mut session = EffectSession::new();
    let mut wearer = Wearer::new(1, Core::new(120).with_module("emergency_shield", 2));
    scheduler.step(&mut session, Tick(1), [&mut wearer]);
    let mob = DamageSource::new("mob").with_attacker(EntityId(3));

    let light = scheduler.on_incoming_attack(&mut session, &mut wearer, Tick(1), &mob, 4.0);
    assert!(!light.is_cancelled());

    let heavy = scheduler.on_incoming_attack(&mut session, &mut wearer, Tick(1), &mob, 12.0);
    assert_eq!(heavy.cancelled_by.as_deref(), Some("emergency_shield"));
    assert_eq!(wearer.core.resource(), 70);

    // level 2 cooldown: 200 − 20 = 180 ticks
    scheduler.step(&mut session, Tick(100), [&mut wearer]);
    let again = scheduler.on_incoming_attack(&mut session, &mut wearer, Tick(100), &mob, 12.0);
    assert!(!again.is_cancelled());

    scheduler.step(&mut session, Tick(181), [&mut wearer]);
    let ready = scheduler.on_incoming_attack(&mut session, &mut wearer, Tick(181), &mob, 12.0);
    assert!(ready.is_cancelled());
    assert_eq!(wearer.core.resource(), 20);
}

#[test]
fn overclock_charges_each_second_and_spends_on_hit() {
    let scheduler = scheduler();
    let mut session = EffectSession::new();
    let mut wearer = Wearer::new(1, Core::new(1000).with_module("overclock", 1));

    // second ticks at 1, 21, 41
    for tick in 1..=41 {
        scheduler.step(&mut session, Tick(tick), [&mut wearer]);
    }
    assert_eq!(wearer.core.storage("overclock:charge").and_then(|v| v.as_int()), Some(3));
    // passive drain of 2 per tick for 41 ticks
    assert_eq!(wearer.core.resource(), 1000 - 82);
    assert_eq!(
        wearer.core.storage("overclock:pulses").and_then(|v| v.as_long()),
        Some(3)
    );

    let hit = scheduler.on_outgoing_damage(
        &mut session,
        &mut wearer,
        Tick(41),
        EntityId(2),
        &DamageSource::new("player"),
        10.0,
    );
    // 10 × (1 + 0.02 × 3)
    assert!((hit.amount - 10.6).abs() < 1e-9, "{}", hit.amount);
    assert!(wearer.core.storage("overclock:charge").is_none());
}

#[test]
fn overclock_loses_charge_when_core_runs_dry() {
    let scheduler = scheduler();
    let mut session = EffectSession::new();
    // 6 pays three drains of 2, reaching zero at tick 3
    let mut wearer = Wearer::new(1, Core::new(6).with_module("overclock", 1));

    for tick in 1..=3 {
        scheduler.step(&mut session, Tick(tick), [&mut wearer]);
    }

    assert_eq!(wearer.core.resource(), 0);
    assert!(wearer.core.storage("overclock:charge").is_none());
}

#[test]
fn overclock_loses_charge_when_drain_goes_unpaid() {
    let scheduler = scheduler();
    let mut session = EffectSession::new();
    // 7 pays three drains of 2 and strands 1
    let mut wearer = Wearer::new(1, Core::new(7).with_module("overclock", 1));

    for tick in 1..=60 {
        scheduler.step(&mut session, Tick(tick), [&mut wearer]);
    }

    assert_eq!(wearer.core.resource(), 1);
    assert!(wearer.core.storage("overclock:charge").is_none());
}
