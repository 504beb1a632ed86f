use lldm_content::CatalogLoader;
use lldm_core::state::VitalRecord;
use lldm_core::{
    ContextBlock, Effect, EngineConfig, EntityId, EntityRecord, ExecuteError, ExecutionStatus,
    Frequency, GameTime, Interaction, InteractionSlot, Invocation, Length, Magnitude,
    StatDirection, TriggerRecord,
};
use lldm_runtime::{
    Event, InteractionEvent, Runtime, RuntimeConfig, RuntimeError, Topic, TriggerEvent,
};

fn strike(amount: i64) -> Interaction {
    Interaction {
        kind: "strike".into(),
        description: "A heavy blow.".into(),
        target: ContextBlock {
            requirements: vec![],
            effects: vec![Effect::stat(
                "damage",
                "cur_hp".parse().expect("valid path"),
                StatDirection::Decrease,
                Magnitude::fixed(amount),
            )],
        },
        ..Interaction::default()
    }
}

fn creature(name: &str, hp: i64) -> EntityRecord {
    let mut record = EntityRecord::named(name);
    record.hp = VitalRecord::full(hp);
    record
}

/// End-to-end: load, strike, observe the event, tick the clock, shut down.
#[tokio::test]
async fn interaction_and_trigger_events_flow() {
    let mut knight = creature("knight", 30);
    knight.interaction = vec![strike(4)];
    let mut wraith = creature("wraith", 20);
    wraith.trigger = vec![TriggerRecord {
        frequency: Frequency::Minute,
        length: Length::Count(2),
        action: Interaction {
            kind: "fade".into(),
            owner: ContextBlock {
                requirements: vec![],
                effects: vec![Effect::stat(
                    "fade",
                    "cur_hp".parse().expect("valid path"),
                    StatDirection::Decrease,
                    Magnitude::fixed(1),
                )],
            },
            ..Interaction::default()
        },
        ..TriggerRecord::default()
    }];

    let (runtime, report) = Runtime::builder()
        .config(RuntimeConfig::default())
        .records([knight, wraith])
        .build();
    assert!(report.is_clean());
    let (knight, wraith) = (report.loaded[0], report.loaded[1]);

    let handle = runtime.handle();
    let mut interactions = handle.subscribe(Topic::Interaction);
    let mut triggers = handle.subscribe(Topic::Trigger);

    let result = handle
        .execute_interaction(knight, 0, vec![wraith])
        .await
        .expect("worker alive");
    assert!(result.is_applied());
    assert_eq!(result.narrative, vec!["A heavy blow.".to_string()]);

    match interactions.recv().await.expect("interaction event") {
        Event::Interaction(InteractionEvent::Executed { result, .. }) => {
            assert_eq!(result.owner, knight);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let fired = handle.advance_clock(60).await.expect("worker alive");
    assert_eq!(fired.len(), 1);
    assert!(matches!(
        triggers.recv().await.expect("fire event"),
        Event::Trigger(TriggerEvent::Fired(_))
    ));
    assert!(matches!(
        triggers.recv().await.expect("clock event"),
        Event::Trigger(TriggerEvent::ClockAdvanced { fired: 1, .. })
    ));

    // Re-delivering the same absolute time is a no-op.
    assert!(
        handle
            .advance_clock_to(GameTime(60))
            .await
            .expect("worker alive")
            .is_empty()
    );

    let world = handle.query_world().await.expect("worker alive");
    let hp = world.entity(wraith).expect("wraith exists").vitals.hp.current();
    assert_eq!(hp, 15);

    runtime.shutdown().await.expect("clean shutdown");
    assert!(matches!(
        handle.query_world().await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

/// Concurrent callers are serialized: no damage is lost or doubled.
#[tokio::test]
async fn concurrent_invocations_are_serialized() {
    let mut knight = creature("knight", 30);
    knight.interaction = vec![strike(1)];
    let (runtime, report) = Runtime::builder()
        .records([knight, creature("dummy", 100)])
        .build();
    let (knight, dummy) = (report.loaded[0], report.loaded[1]);

    let mut tasks = Vec::new();
    for _ in 0..40 {
        let handle = runtime.handle();
        tasks.push(tokio::spawn(async move {
            handle.execute_interaction(knight, 0, vec![dummy]).await
        }));
    }
    for task in tasks {
        let result = task.await.expect("task joins").expect("worker alive");
        assert!(result.is_applied());
    }

    let world = runtime.handle().query_world().await.expect("worker alive");
    assert_eq!(world.entity(dummy).expect("dummy exists").vitals.hp.current(), 60);
    assert_eq!(world.nonce(), 40);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn caller_defects_surface_as_errors() {
    let (runtime, report) = Runtime::builder().records([creature("rock", 1)]).build();
    let rock = report.loaded[0];
    let handle = runtime.handle();

    let err = handle
        .invoke(Invocation {
            owner: rock,
            slot: InteractionSlot::Ability(0),
            user: rock,
            targets: vec![],
        })
        .await
        .expect_err("rock has no abilities");
    assert!(matches!(
        err,
        RuntimeError::Execute(ExecuteError::UnknownInteraction { .. })
    ));

    let result = {
        let mut world = handle.query_world().await.expect("worker alive");
        lldm_core::RulesEngine::new(&mut world).execute_interaction(EntityId(9), 0, vec![])
    };
    assert_eq!(result, Err(ExecuteError::UnknownEntity(EntityId(9))));
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn catalog_world_runs_in_the_runtime() {
    let catalog = CatalogLoader::parse(
        r#"(
            entities: [
                (
                    name: "trap",
                    interaction: [
                        (
                            type: "spring",
                            target: (
                                requirements: [Threshold(reference: "target:cur_hp", minimum: 5)],
                                effects: [
                                    (
                                        name: "snap",
                                        magnitude: Some((base: Value(5))),
                                        operation: Stat(path: "cur_hp", direction: Decrease),
                                    ),
                                ],
                            ),
                        ),
                    ],
                ),
                (name: "goblin", hp: (max: 7)),
            ],
        )"#,
    )
    .expect("catalog syntax is valid");
    let (world, report) = CatalogLoader::build(catalog, EngineConfig::default());
    assert!(report.is_clean());
    let trap = world.id_of("trap").expect("trap loaded");
    let goblin = world.id_of("goblin").expect("goblin loaded");

    let runtime = Runtime::start(world, &RuntimeConfig::default());
    let handle = runtime.handle();

    let first = handle
        .execute_interaction(trap, 0, vec![goblin])
        .await
        .expect("worker alive");
    let second = handle
        .execute_interaction(trap, 0, vec![goblin])
        .await
        .expect("worker alive");

    assert!(first.is_applied());
    assert!(matches!(
        second.status,
        ExecutionStatus::RequirementsFailed { .. }
    ));
    let world = handle.query_world().await.expect("worker alive");
    assert_eq!(world.entity(goblin).expect("goblin exists").vitals.hp.current(), 2);
    runtime.shutdown().await.expect("clean shutdown");
}
