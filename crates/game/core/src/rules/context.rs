//! Explicit evaluation context threaded through every resolver call.
//!
//! A [`Scene`] carries the bindings of one invocation (owner, user, nonce,
//! parameter bag, dice counter). Combined with a world borrow and the entity
//! currently under evaluation it becomes an [`EvalContext`], which resolves
//! references against the world's *current* state.

use std::cell::Cell;

use super::reference::{FieldPath, RefPath, Reference, Scope, Value, VitalPart, WorldField};
use super::{ReferenceError, ValueKind};
use crate::config::EngineConfig;
use crate::rng::{PcgRng, RngOracle, compute_seed};
use crate::state::{Entity, EntityId, ParamValue, Params, World};

/// Per-invocation bindings that do not borrow the world.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'s> {
    pub owner: EntityId,
    pub user: EntityId,
    pub nonce: u64,
    pub params: &'s Params,
    /// Dice counter shared by every roll in the invocation.
    pub rolls: &'s Cell<u32>,
}

impl<'s> Scene<'s> {
    pub fn new(
        owner: EntityId,
        user: EntityId,
        nonce: u64,
        params: &'s Params,
        rolls: &'s Cell<u32>,
    ) -> Self {
        Self {
            owner,
            user,
            nonce,
            params,
            rolls,
        }
    }

    /// Binds the scene to a world snapshot.
    ///
    /// `subject` is the entity whose requirements are being checked;
    /// `target` is what `target:` references read.
    pub fn context<'a>(
        &self,
        world: &'a World,
        subject: EntityId,
        target: Option<EntityId>,
    ) -> EvalContext<'a>
    where
        's: 'a,
    {
        EvalContext {
            world,
            scene: *self,
            subject,
            target,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EvalContext<'a> {
    pub world: &'a World,
    pub scene: Scene<'a>,
    pub subject: EntityId,
    pub target: Option<EntityId>,
}

/// Which parameter bag a hop went through, for cycle detection.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Anchor {
    Entity(EntityId),
    World,
    Invocation,
}

struct Walk<'r> {
    origin: &'r Reference,
    visiting: Vec<(Anchor, String)>,
}

impl<'a> EvalContext<'a> {
    pub fn owner(&self) -> EntityId {
        self.scene.owner
    }

    pub fn user(&self) -> EntityId {
        self.scene.user
    }

    pub fn subject_entity(&self) -> Option<&'a Entity> {
        self.world.entity(self.subject)
    }

    /// Resolves `reference` against the current world state.
    pub fn resolve(&self, reference: &Reference) -> Result<Value, ReferenceError> {
        let mut walk = Walk {
            origin: reference,
            visiting: Vec::new(),
        };
        self.resolve_from(self.scene.owner, reference, &mut walk)
    }

    /// Resolves `reference` and requires an integer.
    pub fn resolve_int(&self, reference: &Reference) -> Result<i64, ReferenceError> {
        match self.resolve(reference)? {
            Value::Int(v) => Ok(v),
            other => Err(ReferenceError::TypeMismatch {
                reference: reference.to_string(),
                expected: ValueKind::Int,
                found: other.kind(),
            }),
        }
    }

    /// Rolls the dice pool for `value`: `value / 3` dice plus `value % 3` pips.
    pub fn roll_pool(&self, value: i64) -> i64 {
        let config = self.world.config();
        let value = value.max(0);
        let dice = (value / EngineConfig::PIPS_PER_DIE).min(EngineConfig::MAX_DICE_PER_ROLL);
        let mut total = value % EngineConfig::PIPS_PER_DIE;
        for _ in 0..dice {
            let counter = self.scene.rolls.get();
            self.scene.rolls.set(counter.wrapping_add(1));
            let seed = compute_seed(
                config.world_seed,
                self.scene.nonce,
                self.scene.owner.0,
                counter,
            );
            total += i64::from(PcgRng.roll_die(seed, config.dice_sides));
        }
        total
    }

    fn unresolved(walk: &Walk<'_>) -> ReferenceError {
        ReferenceError::UnresolvedPath {
            reference: walk.origin.to_string(),
        }
    }

    /// `this` is what `self:` means at this hop. It starts as the owner and
    /// becomes the holder of a parameter when a reference parameter is followed.
    fn resolve_from(
        &self,
        this: EntityId,
        reference: &Reference,
        walk: &mut Walk<'_>,
    ) -> Result<Value, ReferenceError> {
        match (reference.scope(), reference.path()) {
            (Scope::Owner, RefPath::Entity(field)) => self.entity_field(this, field, walk),
            (Scope::User, RefPath::Entity(field)) => self.entity_field(self.scene.user, field, walk),
            (Scope::Target, RefPath::Entity(field)) => {
                let target = self.target.ok_or_else(|| Self::unresolved(walk))?;
                self.entity_field(target, field, walk)
            }
            (Scope::World, RefPath::World(field)) => self.world_field(field, walk),
            (Scope::Parameter, RefPath::Parameter(key)) => {
                let value = self
                    .scene
                    .params
                    .get(key)
                    .ok_or_else(|| Self::unresolved(walk))?;
                self.follow(Anchor::Invocation, key, value, self.scene.owner, walk)
            }
            _ => Err(Self::unresolved(walk)),
        }
    }

    fn world_field(&self, field: &WorldField, walk: &mut Walk<'_>) -> Result<Value, ReferenceError> {
        let clock = self.world.clock();
        let as_int = |v: u64| Value::Int(i64::try_from(v).unwrap_or(i64::MAX));
        Ok(match field {
            WorldField::Clock => as_int(clock.seconds()),
            WorldField::Year => as_int(clock.year()),
            WorldField::Month => as_int(clock.month()),
            WorldField::Day => as_int(clock.day()),
            WorldField::Hour => as_int(clock.hour()),
            WorldField::Minute => as_int(clock.minute()),
            WorldField::Parameter(key) => {
                let value = self
                    .world
                    .parameters
                    .get(key)
                    .ok_or_else(|| Self::unresolved(walk))?;
                return self.follow(Anchor::World, key, value, self.scene.owner, walk);
            }
        })
    }

    fn entity_field(
        &self,
        id: EntityId,
        field: &FieldPath,
        walk: &mut Walk<'_>,
    ) -> Result<Value, ReferenceError> {
        let entity = self.world.entity(id).ok_or_else(|| Self::unresolved(walk))?;
        let lookup = |map: &std::collections::BTreeMap<String, i64>, key: &str| {
            map.get(key)
                .copied()
                .map(Value::Int)
                .ok_or_else(|| Self::unresolved(walk))
        };

        match field {
            FieldPath::Name => Ok(Value::Text(entity.name.clone())),
            FieldPath::Supertype => Ok(Value::Text(entity.supertype.clone())),
            FieldPath::Type => Ok(Value::Text(entity.kind.clone())),
            FieldPath::Subtype => Ok(Value::Text(entity.subtype.clone())),
            FieldPath::Size => Ok(Value::Text(entity.size.to_string())),
            FieldPath::Weight => Ok(Value::Int(entity.weight)),
            FieldPath::Value => Ok(Value::Int(entity.value)),
            FieldPath::Exp => Ok(Value::Int(entity.exp)),
            FieldPath::Bulk => Ok(Value::Int(entity.bulk)),
            FieldPath::Vital(kind, part) => {
                let meter = entity.vitals.get(*kind);
                Ok(Value::Int(match part {
                    VitalPart::Current => meter.current(),
                    VitalPart::Maximum => meter.maximum(),
                }))
            }
            FieldPath::Attribute(key) => lookup(&entity.attributes, key),
            FieldPath::Skill(key) => lookup(&entity.skills, key),
            FieldPath::Specialization(key) => lookup(&entity.specializations, key),
            FieldPath::Quality(key) => lookup(&entity.qualities, key),
            FieldPath::Move(terrain) => Ok(Value::Int(i64::from(entity.movement.get(*terrain)))),
            FieldPath::Passable(terrain) => {
                Ok(Value::Int(i64::from(entity.passable.cost.get(*terrain))))
            }
            FieldPath::Language(key) => Ok(Value::Flag(entity.languages.contains(key))),
            FieldPath::Status(tag) => Ok(Value::Flag(entity.statuses.contains(tag))),
            FieldPath::Inventory(key) => Ok(Value::Int(i64::from(entity.inventory.quantity_of(key)))),
            FieldPath::Parameter(key) => {
                let value = entity
                    .parameters
                    .get(key)
                    .ok_or_else(|| Self::unresolved(walk))?;
                self.follow(Anchor::Entity(id), key, value, id, walk)
            }
        }
    }

    fn follow(
        &self,
        anchor: Anchor,
        key: &str,
        value: &ParamValue,
        this: EntityId,
        walk: &mut Walk<'_>,
    ) -> Result<Value, ReferenceError> {
        let next = match value {
            ParamValue::Int(v) => return Ok(Value::Int(*v)),
            ParamValue::Text(s) => return Ok(Value::Text(s.clone())),
            ParamValue::Flag(b) => return Ok(Value::Flag(*b)),
            ParamValue::Reference(next) => next,
        };

        let hop = (anchor, key.to_owned());
        let too_deep = walk.visiting.len() >= self.world.config().max_reference_depth as usize;
        if too_deep || walk.visiting.contains(&hop) {
            return Err(ReferenceError::Cycle {
                reference: walk.origin.to_string(),
            });
        }

        walk.visiting.push(hop);
        let resolved = self.resolve_from(this, next, walk);
        walk.visiting.pop();
        resolved
    }
}
