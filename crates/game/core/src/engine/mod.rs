//! Invocation pipeline and clock driver.
//!
//! The [`RulesEngine`] is the single mutation path for a [`World`]. It holds
//! the world's `&mut` borrow, so invocations and clock advances are
//! serialized: one invocation's requirement evaluation and effect
//! application finish before the next begins.

mod errors;
mod executor;
mod result;
mod scheduler;

pub use errors::ExecuteError;
pub use result::{ExecutionResult, ExecutionStatus, InvocationSource, TriggerFireResult};

use crate::rules::passage::{self, Passage};
use crate::rules::{InteractionSlot, Invocation, TraceNode, attitude};
use crate::state::{AttitudeVector, EntityId, GameTime, Terrain, World};

pub struct RulesEngine<'a> {
    world: &'a mut World,
}

impl<'a> RulesEngine<'a> {
    pub fn new(world: &'a mut World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    /// Runs one interaction.
    ///
    /// Unknown owner, user or slot is a caller defect and returns `Err`
    /// without consuming a nonce. Everything after that, including unknown
    /// targets, is reported in the [`ExecutionResult`].
    pub fn invoke(&mut self, invocation: Invocation) -> Result<ExecutionResult, ExecuteError> {
        let Invocation {
            owner,
            slot,
            user,
            targets,
        } = invocation;

        if !self.world.contains(user) {
            return Err(ExecuteError::UnknownEntity(user));
        }
        let action = self
            .world
            .entity(owner)
            .ok_or(ExecuteError::UnknownEntity(owner))?
            .interaction(slot)
            .cloned()
            .ok_or(ExecuteError::UnknownInteraction { owner, slot })?;

        Ok(executor::run(
            self.world,
            InvocationSource::Interaction(slot),
            owner,
            user,
            targets,
            &action,
        ))
    }

    /// Owner-as-user shorthand for the owner's `index`-th interaction.
    pub fn execute_interaction(
        &mut self,
        owner: EntityId,
        index: usize,
        targets: Vec<EntityId>,
    ) -> Result<ExecutionResult, ExecuteError> {
        self.invoke(Invocation::by_owner(
            owner,
            InteractionSlot::Interaction(index),
            targets,
        ))
    }

    /// Advances the clock by `delta_secs` and fires due triggers.
    pub fn advance_clock(&mut self, delta_secs: u64) -> Vec<TriggerFireResult> {
        let target = self.world.clock().saturating_add(delta_secs);
        self.advance_clock_to(target)
    }

    /// Advances the clock to an absolute time.
    ///
    /// A time at or before the current clock is a no-op, so re-delivering
    /// the same tick never fires anything twice.
    pub fn advance_clock_to(&mut self, at: GameTime) -> Vec<TriggerFireResult> {
        if at <= self.world.clock() {
            return Vec::new();
        }
        scheduler::advance(self.world, at)
    }

    pub fn attitude(
        &self,
        observer: EntityId,
        subject: EntityId,
    ) -> Result<AttitudeVector, ExecuteError> {
        let observer = self
            .world
            .entity(observer)
            .ok_or(ExecuteError::UnknownEntity(observer))?;
        let subject = self
            .world
            .entity(subject)
            .ok_or(ExecuteError::UnknownEntity(subject))?;
        Ok(attitude::resolve(observer, subject))
    }

    /// Cost for `mover` to cross `obstacle` in `terrain`, with the pass
    /// requirement trace when the obstacle declares any.
    pub fn passage_cost(
        &self,
        obstacle: EntityId,
        mover: EntityId,
        terrain: Terrain,
    ) -> Result<(Passage, Option<TraceNode>), ExecuteError> {
        let obstacle = self
            .world
            .entity(obstacle)
            .ok_or(ExecuteError::UnknownEntity(obstacle))?;
        let mover = self
            .world
            .entity(mover)
            .ok_or(ExecuteError::UnknownEntity(mover))?;
        Ok(passage::passage_cost(self.world, obstacle, mover, terrain)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{
        ContextBlock, Effect, ExecutionError, Interaction, Magnitude, Outcome, Requirement,
        RequirementError, StatDirection, Trigger, TriggerPhase,
    };
    use crate::state::{EntityRecord, Frequency, Length, VitalKind, VitalRecord};

    fn heal(amount: i64) -> Effect {
        Effect::stat(
            "heal",
            "cur_hp".parse().unwrap(),
            StatDirection::Increase,
            Magnitude::fixed(amount),
        )
    }

    fn damage(amount: i64) -> Effect {
        Effect::stat(
            "damage",
            "cur_hp".parse().unwrap(),
            StatDirection::Decrease,
            Magnitude::fixed(amount),
        )
    }

    fn record(name: &str, hp: i64, cur: i64) -> EntityRecord {
        let mut record = EntityRecord::named(name);
        record.hp = VitalRecord {
            max: hp,
            cur: Some(cur),
        };
        record
    }

    fn interaction(target: ContextBlock, user: ContextBlock) -> Interaction {
        Interaction {
            kind: "strike".into(),
            description: "A quick strike.".into(),
            target,
            user,
            ..Interaction::default()
        }
    }

    fn hp(world: &World, id: EntityId) -> i64 {
        world.entity(id).unwrap().vitals.hp.current()
    }

    #[test]
    fn applied_interaction_reports_changes_and_narrative() {
        let mut attacker = record("fighter", 10, 10);
        attacker.mp = VitalRecord::full(5);
        attacker.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![],
                effects: vec![damage(4)],
            },
            ContextBlock {
                requirements: vec![Requirement::cost(VitalKind::Mp, -2)],
                effects: vec![],
            },
        )];
        let mut world = World::default();
        let fighter = world.load_entity(attacker).unwrap();
        let dummy = world.load_entity(record("dummy", 10, 10)).unwrap();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(fighter, 0, vec![dummy])
            .unwrap();

        assert!(result.is_applied());
        assert_eq!(hp(&world, dummy), 6);
        assert_eq!(world.entity(fighter).unwrap().vitals.mp.current(), 3);
        assert_eq!(result.applied.len(), 2);
        assert_eq!(result.narrative, vec!["A quick strike.".to_string()]);
        assert_eq!(result.nonce, 0);
        assert_eq!(world.nonce(), 1);
    }

    #[test]
    fn failed_user_requirement_changes_nothing() {
        let mut attacker = record("fighter", 10, 10);
        attacker.mp = VitalRecord::full(1);
        attacker.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![],
                effects: vec![damage(4)],
            },
            ContextBlock {
                requirements: vec![Requirement::cost(VitalKind::Mp, -2)],
                effects: vec![],
            },
        )];
        let mut world = World::default();
        let fighter = world.load_entity(attacker).unwrap();
        let dummy = world.load_entity(record("dummy", 10, 10)).unwrap();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(fighter, 0, vec![dummy])
            .unwrap();

        assert!(matches!(
            result.status,
            ExecutionStatus::RequirementsFailed { ref defects } if defects.is_empty()
        ));
        assert_eq!(hp(&world, dummy), 10);
        assert_eq!(world.entity(fighter).unwrap().vitals.mp.current(), 1);
        assert!(result.applied.is_empty());
    }

    #[test]
    fn late_failure_rolls_back_the_whole_invocation() {
        let mut caster = record("caster", 10, 10);
        caster.mp = VitalRecord::full(5);
        caster.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![],
                effects: vec![heal(3)],
            },
            ContextBlock {
                requirements: vec![Requirement::cost(VitalKind::Mp, -5)],
                effects: vec![Effect::stat(
                    "bogus",
                    "attribute.nonexistent".parse().unwrap(),
                    StatDirection::Increase,
                    Magnitude::fixed(1),
                )],
            },
        )];
        let mut world = World::default();
        let caster = world.load_entity(caster).unwrap();
        let patient = world.load_entity(record("patient", 10, 2)).unwrap();
        let before_patient = world.entity(patient).cloned();
        let before_caster = world.entity(caster).cloned();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(caster, 0, vec![patient])
            .unwrap();

        assert!(matches!(
            result.error(),
            Some(ExecutionError::Effect(_))
        ));
        assert_eq!(world.entity(patient).cloned(), before_patient);
        assert_eq!(world.entity(caster).cloned(), before_caster);
    }

    #[test]
    fn pass_outcome_effects_bind_to_the_tested_target() {
        let mut spec = Requirement::test(Magnitude::fixed(10), Magnitude::fixed(1));
        if let Requirement::Test(test) = &mut spec {
            test.pass = Outcome::describe("The blow lands.").with_effect(damage(2));
            test.fail = Outcome::describe("The blow misses.");
        }
        let mut attacker = record("fighter", 10, 10);
        attacker.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![spec],
                effects: vec![],
            },
            ContextBlock::default(),
        )];
        let mut world = World::default();
        let fighter = world.load_entity(attacker).unwrap();
        let dummy = world.load_entity(record("dummy", 10, 10)).unwrap();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(fighter, 0, vec![dummy])
            .unwrap();

        assert!(result.is_applied());
        assert_eq!(hp(&world, dummy), 8);
        assert_eq!(hp(&world, fighter), 10);
        assert!(result.narrative.contains(&"The blow lands.".to_string()));
    }

    #[test]
    fn negated_failing_test_applies_its_fail_outcome() {
        let mut stumble = Requirement::test(Magnitude::fixed(1), Magnitude::fixed(10));
        if let Requirement::Test(test) = &mut stumble {
            test.fail = Outcome::describe("You stumble.").with_effect(damage(3));
        }
        let mut hero = record("hero", 10, 10);
        hero.interaction = vec![Interaction {
            kind: "leap".into(),
            user: ContextBlock {
                requirements: vec![Requirement::Not(vec![stumble])],
                effects: vec![],
            },
            ..Interaction::default()
        }];
        let mut world = World::default();
        let hero = world.load_entity(hero).unwrap();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(hero, 0, vec![])
            .unwrap();

        assert!(result.is_applied());
        assert_eq!(hp(&world, hero), 7);
        assert_eq!(result.narrative, vec!["You stumble.".to_string()]);
    }

    #[test]
    fn target_context_without_targets_fails_closed() {
        let mut archer = record("archer", 10, 10);
        archer.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![Requirement::threshold(
                    "target:cur_hp".parse().unwrap(),
                    1000,
                )],
                effects: vec![damage(5)],
            },
            ContextBlock::default(),
        )];
        let mut world = World::default();
        let archer = world.load_entity(archer).unwrap();
        let before = world.entity(archer).cloned();

        let result = RulesEngine::new(&mut world)
            .execute_interaction(archer, 0, vec![])
            .unwrap();

        assert!(matches!(
            result.status,
            ExecutionStatus::RequirementsFailed { ref defects }
                if defects == &[RequirementError::MissingSubject("target".into())]
        ));
        assert!(result.applied.is_empty());
        assert_eq!(world.entity(archer).cloned(), before);
        assert_eq!(world.nonce(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn aborted_invocation_only_moves_the_nonce_in_the_state_root() {
        let mut healer = record("healer", 10, 10);
        healer.mp = VitalRecord::full(5);
        healer.interaction = vec![interaction(
            ContextBlock {
                requirements: vec![],
                effects: vec![heal(4), Effect::status("blessed", None)],
            },
            ContextBlock {
                requirements: vec![Requirement::cost(VitalKind::Mp, -2)],
                effects: vec![],
            },
        )];
        let mut world = World::default();
        let healer = world.load_entity(healer).unwrap();
        let patient = world.load_entity(record("patient", 10, 1)).unwrap();

        let before = hex::encode(world.state_root());
        let mut expected = world.clone();
        expected.next_nonce();
        let expected = hex::encode(expected.state_root());

        let result = RulesEngine::new(&mut world)
            .execute_interaction(healer, 0, vec![patient])
            .unwrap();

        // `blessed` was never registered as a template.
        assert!(matches!(result.status, ExecutionStatus::Aborted(_)));
        let after = hex::encode(world.state_root());
        assert_ne!(after, before);
        assert_eq!(after, expected);
    }

    #[test]
    fn unknown_target_aborts_and_unknown_slot_errors() {
        let mut attacker = record("fighter", 10, 10);
        attacker.interaction = vec![interaction(ContextBlock::default(), ContextBlock::default())];
        let mut world = World::default();
        let fighter = world.load_entity(attacker).unwrap();
        let mut engine = RulesEngine::new(&mut world);

        let result = engine
            .execute_interaction(fighter, 0, vec![EntityId(99)])
            .unwrap();
        assert!(matches!(result.status, ExecutionStatus::Aborted(_)));

        assert_eq!(
            engine.execute_interaction(fighter, 3, vec![]),
            Err(ExecuteError::UnknownInteraction {
                owner: fighter,
                slot: InteractionSlot::Interaction(3),
            })
        );
        assert_eq!(
            engine.execute_interaction(EntityId(42), 0, vec![]),
            Err(ExecuteError::UnknownEntity(EntityId(42)))
        );
    }

    #[test]
    fn hourly_trigger_fires_once_per_advance() {
        let regen = Interaction {
            kind: "regenerate".into(),
            owner: ContextBlock {
                requirements: vec![],
                effects: vec![heal(1)],
            },
            ..Interaction::default()
        };
        let mut troll = record("troll", 10, 1);
        troll.trigger = vec![crate::state::TriggerRecord {
            frequency: Frequency::Hour,
            length: Length::Indefinite,
            action: regen,
            ..Default::default()
        }];
        let mut world = World::default();
        let troll = world.load_entity(troll).unwrap();
        let mut engine = RulesEngine::new(&mut world);

        assert!(engine.advance_clock(1_800).is_empty());
        let fired = engine.advance_clock(1_800);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].phase, TriggerPhase::Idle);
        assert_eq!(hp(engine.world(), troll), 2);

        // 1.9 hours in one call still fires exactly once.
        let fired = engine.advance_clock(6_840);
        assert_eq!(fired.len(), 1);
        assert_eq!(hp(engine.world(), troll), 3);

        let now = engine.world().clock();
        assert!(engine.advance_clock_to(now).is_empty());
        assert!(engine.advance_clock_to(GameTime::ZERO).is_empty());
        assert_eq!(hp(engine.world(), troll), 3);
    }

    #[test]
    fn bounded_trigger_expires_after_its_window() {
        let mut candle = record("candle", 3, 3);
        candle.trigger = vec![crate::state::TriggerRecord {
            frequency: Frequency::Hour,
            length: Length::Count(2),
            action: Interaction {
                kind: "burn".into(),
                owner: ContextBlock {
                    requirements: vec![],
                    effects: vec![damage(1)],
                },
                ..Interaction::default()
            },
            ..Default::default()
        }];
        let mut world = World::default();
        let candle = world.load_entity(candle).unwrap();
        let mut engine = RulesEngine::new(&mut world);

        assert_eq!(
            engine.advance_clock(3_600)[0].phase,
            TriggerPhase::Idle
        );
        assert_eq!(
            engine.advance_clock(3_600)[0].phase,
            TriggerPhase::Expired
        );
        assert!(engine.advance_clock(3_600).is_empty());
        assert_eq!(hp(engine.world(), candle), 1);
    }

    #[test]
    fn failed_trigger_advances_unless_retrying() {
        let gated = |retry_on_fail| crate::state::TriggerRecord {
            frequency: Frequency::Hour,
            length: Length::Indefinite,
            retry_on_fail,
            action: Interaction {
                kind: "gated".into(),
                owner: ContextBlock {
                    requirements: vec![Requirement::threshold(
                        "world:parameter.open".parse().unwrap(),
                        1,
                    )],
                    effects: vec![heal(1)],
                },
                ..Interaction::default()
            },
            ..Default::default()
        };
        let mut stubborn = record("stubborn", 10, 1);
        stubborn.trigger = vec![gated(false)];
        let mut patient = record("patient", 10, 1);
        patient.trigger = vec![gated(true)];

        let mut world = World::default();
        world
            .parameters
            .insert("open".into(), crate::state::ParamValue::Int(0));
        let stubborn = world.load_entity(stubborn).unwrap();
        let patient = world.load_entity(patient).unwrap();

        let fired = RulesEngine::new(&mut world).advance_clock(3_600);
        assert_eq!(fired.len(), 2);
        assert!(fired.iter().all(|fire| !fire.result.is_applied()));

        world
            .parameters
            .insert("open".into(), crate::state::ParamValue::Int(1));
        let fired = RulesEngine::new(&mut world).advance_clock(60);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].owner, patient);
        assert!(fired[0].result.is_applied());
        assert_eq!(hp(&world, patient), 2);
        assert_eq!(hp(&world, stubborn), 1);
    }
}
