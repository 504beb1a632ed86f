//! Atomic effect application.
//!
//! Every mutation first records a pre-image of the touched entity in a
//! [`Journal`]. On error the journal restores those pre-images, so a failed
//! list (or a failed invocation sharing one journal) leaves no visible change.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Effect, InventoryOp, Operation, StatDirection};
use crate::rules::context::Scene;
use crate::rules::reference::{FieldPath, VitalPart};
use crate::rules::requirement::ResourceCost;
use crate::rules::{EffectError, ExecutionError};
use crate::state::{Entity, EntityId, GameTime, StatusAttach, VitalKind, World};

/// One committed mutation, reported for logging and rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppliedChange {
    Cost {
        entity: EntityId,
        vital: VitalKind,
        before: i64,
        after: i64,
    },
    Stat {
        entity: EntityId,
        effect: String,
        path: FieldPath,
        before: i64,
        after: i64,
    },
    Status {
        entity: EntityId,
        tag: String,
        expires_at: Option<GameTime>,
        refreshed: bool,
    },
    Inventory {
        entity: EntityId,
        effect: String,
        key: String,
        before: u32,
        after: u32,
    },
    Extension {
        entity: EntityId,
        effect: String,
        kind: String,
        data: BTreeMap<String, String>,
    },
}

impl AppliedChange {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Cost { entity, .. }
            | Self::Stat { entity, .. }
            | Self::Status { entity, .. }
            | Self::Inventory { entity, .. }
            | Self::Extension { entity, .. } => *entity,
        }
    }
}

/// Pre-images of every entity touched since the journal was opened.
#[derive(Debug, Default)]
pub struct Journal {
    pre_images: BTreeMap<EntityId, Entity>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch<'w>(
        &mut self,
        world: &'w mut World,
        id: EntityId,
        effect: &str,
    ) -> Result<&'w mut Entity, EffectError> {
        if !self.pre_images.contains_key(&id) {
            let entity = world.entity(id).ok_or_else(|| EffectError::InvalidTarget {
                effect: effect.to_owned(),
                entity: id,
            })?;
            self.pre_images.insert(id, entity.clone());
        }
        world.entity_mut(id).ok_or_else(|| EffectError::InvalidTarget {
            effect: effect.to_owned(),
            entity: id,
        })
    }

    pub fn touched(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.pre_images.keys().copied()
    }

    /// Restores every pre-image.
    pub fn rollback(self, world: &mut World) {
        for (_, entity) in self.pre_images {
            world.restore(entity);
        }
    }
}

/// Applies `effects` to `subject` as one atomic list.
pub fn apply(
    world: &mut World,
    effects: &[Effect],
    scene: Scene<'_>,
    subject: EntityId,
    target: Option<EntityId>,
) -> Result<Vec<AppliedChange>, ExecutionError> {
    let mut journal = Journal::new();
    let mut applied = Vec::with_capacity(effects.len());
    match apply_in(world, &mut journal, effects, scene, subject, target, &mut applied) {
        Ok(()) => Ok(applied),
        Err(err) => {
            debug!(target: "lldm::effect", error = %err, "effect list rolled back");
            journal.rollback(world);
            Err(err)
        }
    }
}

/// Applies `effects` inside a caller-owned journal. The caller rolls back.
pub fn apply_in(
    world: &mut World,
    journal: &mut Journal,
    effects: &[Effect],
    scene: Scene<'_>,
    subject: EntityId,
    target: Option<EntityId>,
    applied: &mut Vec<AppliedChange>,
) -> Result<(), ExecutionError> {
    for effect in effects {
        let change = apply_one(world, journal, effect, scene, subject, target)?;
        applied.push(change);
    }
    Ok(())
}

/// Deducts (or refunds) a bound resource cost.
pub fn pay_cost(
    world: &mut World,
    journal: &mut Journal,
    entity: EntityId,
    cost: &ResourceCost,
) -> Result<AppliedChange, ExecutionError> {
    let target = journal.touch(world, entity, "cost")?;
    let meter = target.vitals.get_mut(cost.vital);
    let before = meter.current();
    let after = meter.apply_delta(cost.amount);
    Ok(AppliedChange::Cost {
        entity,
        vital: cost.vital,
        before,
        after,
    })
}

fn apply_one(
    world: &mut World,
    journal: &mut Journal,
    effect: &Effect,
    scene: Scene<'_>,
    subject: EntityId,
    target: Option<EntityId>,
) -> Result<AppliedChange, ExecutionError> {
    match &effect.operation {
        Operation::Stat { path, direction } => {
            let magnitude = effect
                .magnitude
                .as_ref()
                .ok_or_else(|| EffectError::MissingMagnitude {
                    effect: effect.name.clone(),
                })?;
            let amount = {
                let ctx = scene.context(world, subject, target);
                magnitude.evaluate(&ctx)?
            };
            let entity = journal.touch(world, subject, &effect.name)?;
            let (before, after) = write_stat(entity, path, *direction, amount).ok_or_else(|| {
                EffectError::UnknownStatPath {
                    effect: effect.name.clone(),
                    entity: subject,
                    path: path.to_string(),
                }
            })?;
            Ok(AppliedChange::Stat {
                entity: subject,
                effect: effect.name.clone(),
                path: path.clone(),
                before,
                after,
            })
        }

        Operation::Status => {
            let expires_at = effect
                .duration
                .and_then(|duration| duration.expires_after(world.clock()));
            let status = world
                .instantiate_status(&effect.name, effect.template_name(), expires_at)
                .ok_or_else(|| EffectError::UnknownTemplate {
                    effect: effect.name.clone(),
                    template: effect.template_name().to_owned(),
                })?;
            let limit = world.config().max_status_effects;
            let entity = journal.touch(world, subject, &effect.name)?;
            let refreshed = match entity.statuses.attach(status, limit) {
                StatusAttach::Added => false,
                StatusAttach::Refreshed => true,
                StatusAttach::Full => {
                    return Err(EffectError::StatusLimit {
                        entity: subject,
                        limit,
                    }
                    .into());
                }
            };
            let expires_at = entity
                .statuses
                .get(&effect.name)
                .and_then(|status| status.expires_at);
            Ok(AppliedChange::Status {
                entity: subject,
                tag: effect.name.clone(),
                expires_at,
                refreshed,
            })
        }

        Operation::Inventory(op) => {
            let entity = journal.touch(world, subject, &effect.name)?;
            let key = match op {
                InventoryOp::Add(item) | InventoryOp::Set(item) => item.key.clone(),
                InventoryOp::Remove(key) => key.clone(),
            };
            let before = entity.inventory.quantity_of(&key);
            match op {
                InventoryOp::Add(item) => entity.inventory.add(item.clone())?,
                InventoryOp::Set(item) => entity.inventory.set(item.clone())?,
                InventoryOp::Remove(key) => {
                    entity.inventory.remove(key);
                }
            }
            Ok(AppliedChange::Inventory {
                entity: subject,
                effect: effect.name.clone(),
                key: key.clone(),
                before,
                after: entity.inventory.quantity_of(&key),
            })
        }

        Operation::Extension { kind, data } => {
            if !world.contains(subject) {
                return Err(EffectError::InvalidTarget {
                    effect: effect.name.clone(),
                    entity: subject,
                }
                .into());
            }
            Ok(AppliedChange::Extension {
                entity: subject,
                effect: effect.name.clone(),
                kind: kind.clone(),
                data: data.clone(),
            })
        }
    }
}

fn combine(before: i64, direction: StatDirection, amount: i64) -> i64 {
    match direction {
        StatDirection::Decrease => before.saturating_sub(amount),
        StatDirection::Increase => before.saturating_add(amount),
        StatDirection::Set => amount,
    }
}

/// Writes a numeric stat. `None` when the path is not a writable stat.
fn write_stat(
    entity: &mut Entity,
    path: &FieldPath,
    direction: StatDirection,
    amount: i64,
) -> Option<(i64, i64)> {
    let plain = |slot: &mut i64, floor: Option<i64>| {
        let before = *slot;
        let next = combine(before, direction, amount);
        *slot = floor.map_or(next, |floor| next.max(floor));
        (before, *slot)
    };

    match path {
        FieldPath::Vital(kind, VitalPart::Current) => {
            let meter = entity.vitals.get_mut(*kind);
            let before = meter.current();
            let after = meter.set_current(combine(before, direction, amount));
            Some((before, after))
        }
        FieldPath::Vital(kind, VitalPart::Maximum) => {
            let meter = entity.vitals.get_mut(*kind);
            let before = meter.maximum();
            let after = meter.set_maximum(combine(before, direction, amount));
            Some((before, after))
        }
        FieldPath::Attribute(key) => entity.attributes.get_mut(key).map(|v| plain(v, None)),
        FieldPath::Skill(key) => entity.skills.get_mut(key).map(|v| plain(v, None)),
        FieldPath::Specialization(key) => {
            entity.specializations.get_mut(key).map(|v| plain(v, None))
        }
        FieldPath::Quality(key) => entity.qualities.get_mut(key).map(|v| plain(v, None)),
        FieldPath::Weight => Some(plain(&mut entity.weight, Some(0))),
        FieldPath::Bulk => Some(plain(&mut entity.bulk, Some(0))),
        FieldPath::Value => Some(plain(&mut entity.value, None)),
        FieldPath::Exp => Some(plain(&mut entity.exp, None)),
        _ => None,
    }
}
