//! Interval, resource and passive drain gates.

mod common;

use std::sync::{Arc, Mutex};

use common::{TestCarrier, assert_close};
use effect_core::{
    Core, EffectCallback, EffectDescriptor, EffectSession, HookResult, ModuleCatalog,
    ModuleDefinition, ModuleHandler, ResolutionContext, Scheduler, Tick,
};

fn counter() -> EffectCallback {
    EffectCallback::new("count", |ctx, _event| {
        let n = ctx.storage_int("count", 0);
        ctx.set_storage("count", n + 1);
        Ok(())
    })
}

fn single(definition: ModuleDefinition) -> Scheduler {
    Scheduler::new(ModuleCatalog::from_definitions([definition]).unwrap())
}

fn run(scheduler: &Scheduler, carrier: &mut TestCarrier, ticks: std::ops::RangeInclusive<u64>) {
    let mut session = EffectSession::new();
    for tick in ticks {
        scheduler.step(&mut session, Tick(tick), [&mut *carrier]);
    }
}

#[test]
fn periodic_effect_fires_once_per_interval() {
    let scheduler = single(
        ModuleDefinition::builder("pulse")
            .effect(
                EffectDescriptor::periodic_callback(counter())
                    .interval(10)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(0).with_module("pulse", 1));

    // fires at 1, 11, 21, ..., 91
    run(&scheduler, &mut carrier, 1..=100);

    assert_eq!(carrier.stored("pulse:count").and_then(|v| v.as_int()), Some(10));
}

#[test]
fn healing_scales_and_waits_for_interval() {
    let scheduler = single(
        ModuleDefinition::builder("regen")
            .effect(
                EffectDescriptor::healing()
                    .base_value(1.0)
                    .per_level(0.5)
                    .interval(20)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(0).with_module("regen", 3));

    // ticks 1, 21, 41 heal 1.0 + 0.5 × 2 each
    run(&scheduler, &mut carrier, 1..=41);

    assert_close(carrier.body.healed, 6.0);
}

#[test]
fn resource_restore_pays_exactly_per_firing() {
    let scheduler = single(
        ModuleDefinition::builder("recycler")
            .effect(
                EffectDescriptor::resource_restore()
                    .amount(2)
                    .per_level(1)
                    .saturation(0.5)
                    .interval(5)
                    .resource_cost(7)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    // 30 pays for four firings of 7 with 2 left over
    let mut carrier = TestCarrier::new(1, Core::new(30).with_module("recycler", 2));

    run(&scheduler, &mut carrier, 1..=50);

    assert_eq!(carrier.resource(), 2);
    // four firings of 2 + 1 × (2 − 1)
    assert_eq!(carrier.body.sustenance, 12);
    assert_close(carrier.body.saturation, 2.0);
}

#[test]
fn starved_effect_waits_for_next_interval() {
    let scheduler = single(
        ModuleDefinition::builder("regen")
            .effect(
                EffectDescriptor::healing()
                    .base_value(1.0)
                    .interval(10)
                    .resource_cost(5)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(5).with_resource(0).with_module("regen", 1));
    let mut session = EffectSession::new();

    scheduler.step(&mut session, Tick(1), [&mut carrier]);
    assert_close(carrier.body.healed, 0.0);

    // Recharged, but the interval gate already consumed tick 1
    carrier.core_mut().recharge(5);
    scheduler.step(&mut session, Tick(2), [&mut carrier]);
    assert_close(carrier.body.healed, 0.0);

    scheduler.step(&mut session, Tick(11), [&mut carrier]);
    assert_close(carrier.body.healed, 1.0);
    assert_eq!(carrier.resource(), 0);
}

#[test]
fn earlier_effect_spends_first_within_a_module() {
    let scheduler = single(
        ModuleDefinition::builder("twin")
            .effect(
                EffectDescriptor::healing()
                    .effect_id("mend_small")
                    .base_value(1.0)
                    .resource_cost(5)
                    .build()
                    .unwrap(),
            )
            .effect(
                EffectDescriptor::healing()
                    .effect_id("mend_large")
                    .base_value(2.0)
                    .resource_cost(5)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(7).with_module("twin", 1));

    run(&scheduler, &mut carrier, 1..=1);

    // 7 pays the first 5; the second effect starves on the 2 left
    assert_close(carrier.body.healed, 1.0);
    assert_eq!(carrier.resource(), 2);
}

#[test]
fn zero_interval_fires_once_per_tick() {
    let scheduler = single(
        ModuleDefinition::builder("pulse")
            .effect(
                EffectDescriptor::periodic_callback(counter())
                    .interval(0)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(0).with_module("pulse", 1));
    let mut session = EffectSession::new();

    for tick in [1, 1, 1, 2, 2, 3] {
        scheduler.step(&mut session, Tick(tick), [&mut carrier]);
    }

    assert_eq!(carrier.stored("pulse:count").and_then(|v| v.as_int()), Some(3));
}

struct Drainer {
    cost: u32,
    edges: Arc<Mutex<Vec<&'static str>>>,
}

impl ModuleHandler for Drainer {
    fn on_tick(&self, ctx: &mut ResolutionContext<'_>) -> HookResult {
        let ticks = ctx.storage_int("ticks", 0);
        ctx.set_storage("ticks", ticks + 1);
        Ok(())
    }

    fn passive_energy_cost(&self) -> u32 {
        self.cost
    }

    fn on_energy_depleted(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        self.edges.lock().unwrap().push("depleted");
        Ok(())
    }

    fn on_energy_restored(&self, _ctx: &mut ResolutionContext<'_>) -> HookResult {
        self.edges.lock().unwrap().push("restored");
        Ok(())
    }
}

#[test]
fn unpaid_passive_drain_skips_the_module() {
    let edges = Arc::new(Mutex::new(Vec::new()));
    let scheduler = single(
        ModuleDefinition::builder("drainer")
            .effect(
                EffectDescriptor::stat_modifier("power")
                    .base_value(1.0)
                    .build()
                    .unwrap(),
            )
            .handler(Drainer {
                cost: 3,
                edges: edges.clone(),
            })
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(10).with_module("drainer", 1));
    let mut session = EffectSession::new();

    let mut starved = 0;
    for tick in 1..=5 {
        starved += scheduler.step(&mut session, Tick(tick), [&mut carrier]).starved;
    }

    // 10 pays three drains of 3; ticks 4 and 5 are skipped
    assert_eq!(starved, 2);
    assert_eq!(carrier.resource(), 1);
    assert_eq!(carrier.stored("drainer:ticks").and_then(|v| v.as_int()), Some(3));
    // A starved module stays Active; its modifier is not torn down
    assert_eq!(carrier.body.modifiers_on("power").len(), 1);
    // 1 left over cannot pay 3, which counts as running dry
    assert_eq!(*edges.lock().unwrap(), ["depleted"]);
}

#[test]
fn energy_edges_fire_once_per_transition() {
    let edges = Arc::new(Mutex::new(Vec::new()));
    let scheduler = single(
        ModuleDefinition::builder("drainer")
            .handler(Drainer {
                cost: 5,
                edges: edges.clone(),
            })
            .build()
            .unwrap(),
    );
    let mut carrier = TestCarrier::new(1, Core::new(10).with_module("drainer", 1));
    let mut session = EffectSession::new();

    // 10 → 5 → 0: depleted observed at tick 2
    for tick in 1..=4 {
        scheduler.step(&mut session, Tick(tick), [&mut carrier]);
    }
    assert_eq!(*edges.lock().unwrap(), ["depleted"]);

    // 0 + 7, then a drain of 5 leaves 2
    carrier.core_mut().recharge(7);
    scheduler.step(&mut session, Tick(5), [&mut carrier]);
    assert_eq!(*edges.lock().unwrap(), ["depleted", "restored"]);
    assert_eq!(carrier.resource(), 2);
}
