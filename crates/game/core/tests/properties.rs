//! Cross-module properties of the rules engine.

use std::cell::Cell;

use lldm_core::rules::{Scene, effect, requirement};
use lldm_core::state::{AttitudeOverride, VitalRecord};
use lldm_core::{
    AttitudeVector, ContextBlock, Effect, EffectError, EntityId, EntityRecord, ExecutionError,
    ExecutionStatus, Interaction, InventoryEntry, InventoryError, InventoryOp, Magnitude,
    ParamValue, Params, Requirement, RulesEngine, StatDirection, VitalKind, World,
};

fn creature(name: &str, max_hp: i64, cur_hp: i64) -> EntityRecord {
    let mut record = EntityRecord::named(name);
    record.hp = VitalRecord {
        max: max_hp,
        cur: Some(cur_hp),
    };
    record
}

fn hp_effect(name: &str, direction: StatDirection, amount: i64) -> Effect {
    Effect::stat(
        name,
        "cur_hp".parse().expect("valid path"),
        direction,
        Magnitude::fixed(amount),
    )
}

/// Runs `effects` on `subject` with the subject as its own owner and user.
fn apply(
    world: &mut World,
    subject: EntityId,
    effects: &[Effect],
) -> Result<Vec<lldm_core::AppliedChange>, ExecutionError> {
    let params = Params::new();
    let rolls = Cell::new(0);
    let scene = Scene::new(subject, subject, world.nonce(), &params, &rolls);
    effect::apply(world, effects, scene, subject, Some(subject))
}

#[test]
fn vitals_stay_within_bounds_under_any_sequence() {
    let mut world = World::default();
    let id = world
        .load_entity(creature("golem", 20, 10))
        .expect("golem loads");

    let sequence = [
        (StatDirection::Decrease, 7),
        (StatDirection::Decrease, 50),
        (StatDirection::Increase, 3),
        (StatDirection::Increase, 1_000),
        (StatDirection::Decrease, -4),
        (StatDirection::Set, -9),
        (StatDirection::Set, 99),
    ];
    for (direction, amount) in sequence {
        let _ = apply(&mut world, id, &[hp_effect("poke", direction, amount)]);
        let hp = &world.entity(id).expect("golem exists").vitals.hp;
        assert!(
            (0..=hp.maximum()).contains(&hp.current()),
            "hp {} escaped [0, {}]",
            hp.current(),
            hp.maximum()
        );
    }
}

#[test]
fn requirement_evaluation_is_read_only() {
    let mut caster = creature("caster", 10, 10);
    caster.mp = VitalRecord::full(8);
    let mut world = World::default();
    let id = world.load_entity(caster).expect("caster loads");
    let before = world.clone();

    let params = Params::new();
    let rolls = Cell::new(0);
    let scene = Scene::new(id, id, world.nonce(), &params, &rolls);
    let ctx = scene.context(&world, id, None);
    for tree in [
        vec![Requirement::cost(VitalKind::Mp, -3)],
        vec![Requirement::cost(VitalKind::Mp, -30)],
        vec![Requirement::Not(vec![])],
    ] {
        requirement::evaluate(&tree, "check", &ctx).expect("no broken references");
    }

    assert_eq!(world, before);
}

#[test]
fn or_stops_at_first_passing_child() {
    let mut world = World::default();
    world.parameters.insert("no".into(), ParamValue::Flag(false));
    world.parameters.insert("yes".into(), ParamValue::Flag(true));
    let id = world
        .load_entity(creature("judge", 5, 5))
        .expect("judge loads");

    let flag = |name: &str| {
        Requirement::Flag(
            format!("world:parameter.{name}")
                .parse()
                .expect("valid reference"),
        )
    };
    let tree = [Requirement::Or(vec![flag("no"), flag("yes"), flag("yes")])];

    let params = Params::new();
    let rolls = Cell::new(0);
    let scene = Scene::new(id, id, world.nonce(), &params, &rolls);
    let evaluation = requirement::evaluate(&tree, "check", &scene.context(&world, id, None))
        .expect("no broken references");

    assert!(evaluation.passed);
    let or = evaluation.trace.find("or").expect("or node traced");
    assert_eq!(or.children.len(), 2);
    assert!(!or.children[0].passed);
    assert!(or.children[1].passed);
}

#[test]
fn matching_attitude_overrides_are_cumulative() {
    let plus_one = |pattern: &str| AttitudeOverride {
        pattern: pattern.parse().expect("valid pattern"),
        modifier: AttitudeVector {
            trust: 1,
            ..AttitudeVector::default()
        },
        clamp: None,
    };
    let mut innkeeper = EntityRecord::named("innkeeper");
    innkeeper.attitude.overrides = vec![plus_one("supertype:humanoid"), plus_one("*")];
    let mut traveller = EntityRecord::named("traveller");
    traveller.supertype = "humanoid".into();

    let mut world = World::default();
    let innkeeper = world.load_entity(innkeeper).expect("innkeeper loads");
    let traveller = world.load_entity(traveller).expect("traveller loads");

    let attitude = RulesEngine::new(&mut world)
        .attitude(innkeeper, traveller)
        .expect("both entities exist");
    assert_eq!(attitude.trust, 2);
}

#[test]
fn failing_effect_list_leaves_target_untouched() {
    let mut world = World::default();
    let id = world
        .load_entity(creature("patient", 20, 5))
        .expect("patient loads");
    let before = world.entity(id).cloned();

    let err = apply(
        &mut world,
        id,
        &[
            hp_effect("heal", StatDirection::Increase, 10),
            Effect::stat(
                "typo",
                "attribute.strenght".parse().expect("valid path"),
                StatDirection::Increase,
                Magnitude::fixed(1),
            ),
        ],
    )
    .expect_err("second effect writes an unknown path");

    assert!(matches!(
        err,
        ExecutionError::Effect(EffectError::UnknownStatPath { .. })
    ));
    assert_eq!(world.entity(id).cloned(), before);
}

#[test]
fn resource_requirement_boundary() {
    let spell = Interaction {
        kind: "spark".into(),
        user: ContextBlock {
            requirements: vec![Requirement::cost(VitalKind::Mp, -5)],
            effects: vec![],
        },
        ..Interaction::default()
    };
    let mut world = World::default();
    let mut ids = Vec::new();
    for (name, mp) in [("five", 5), ("four", 4)] {
        let mut caster = EntityRecord::named(name);
        caster.mp = VitalRecord {
            max: 10,
            cur: Some(mp),
        };
        caster.interaction = vec![spell.clone()];
        ids.push(world.load_entity(caster).expect("caster loads"));
    }

    let mut engine = RulesEngine::new(&mut world);
    let rich = engine
        .execute_interaction(ids[0], 0, vec![])
        .expect("known interaction");
    let poor = engine
        .execute_interaction(ids[1], 0, vec![])
        .expect("known interaction");

    assert!(rich.is_applied());
    assert!(matches!(
        poor.status,
        ExecutionStatus::RequirementsFailed { .. }
    ));
    let mp = |id: EntityId| world.entity(id).expect("caster exists").vitals.mp.current();
    assert_eq!(mp(ids[0]), 0);
    assert_eq!(mp(ids[1]), 4);
}

#[test]
fn inventory_overflow_is_rejected_whole() {
    let mut pouch = EntityRecord::named("pouch");
    pouch.inventory_rules.quantity_allowed = Some(3);
    pouch.inventory = vec![InventoryEntry::new("coin", "currency", 2)];
    let mut world = World::default();
    let id = world.load_entity(pouch).expect("pouch loads");
    let before = world.entity(id).expect("pouch exists").inventory.clone();

    let err = apply(
        &mut world,
        id,
        &[Effect::inventory(
            "stuff",
            InventoryOp::Add(InventoryEntry::new("coin", "currency", 2)),
        )],
    )
    .expect_err("pouch holds at most three");

    assert_eq!(
        err,
        ExecutionError::Inventory(InventoryError::Capacity {
            requested: 4,
            allowed: 3,
        })
    );
    assert_eq!(world.entity(id).expect("pouch exists").inventory, before);
}

#[test]
fn aborted_invocation_leaves_entities_untouched() {
    let mut healer = creature("healer", 10, 10);
    healer.mp = VitalRecord::full(5);
    healer.interaction = vec![Interaction {
        kind: "botched heal".into(),
        target: ContextBlock {
            requirements: vec![],
            effects: vec![
                hp_effect("heal", StatDirection::Increase, 4),
                Effect::status("blessed", None),
            ],
        },
        user: ContextBlock {
            requirements: vec![Requirement::cost(VitalKind::Mp, -2)],
            effects: vec![],
        },
        ..Interaction::default()
    }];
    let mut world = World::default();
    let healer = world.load_entity(healer).expect("healer loads");
    let patient = world
        .load_entity(creature("patient", 10, 1))
        .expect("patient loads");

    let entities_before: Vec<_> = world.entities().cloned().collect();
    let result = RulesEngine::new(&mut world)
        .execute_interaction(healer, 0, vec![patient])
        .expect("known interaction");

    // `blessed` was never registered as a template.
    assert!(matches!(
        result.error(),
        Some(ExecutionError::Effect(EffectError::UnknownTemplate { .. }))
    ));
    let entities_after: Vec<_> = world.entities().cloned().collect();
    assert_eq!(entities_before, entities_after);
    assert_eq!(world.nonce(), 1);
}
