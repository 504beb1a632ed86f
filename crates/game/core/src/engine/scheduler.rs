//! Clock advance: status expiry and the trigger state machine.
//!
//! Firing decisions compare elapsed time against each trigger's stored
//! timestamp, so re-delivering an interval that was already processed is a
//! no-op. Within one advance a trigger fires at most once.

use tracing::{debug, info};

use super::{ExecutionResult, InvocationSource, TriggerFireResult, executor};
use crate::rules::TriggerPhase;
use crate::state::{EntityId, GameTime, World};

/// Moves the clock to `now` and fires every due trigger.
///
/// Callers guarantee `now` is later than the current clock.
pub(super) fn advance(world: &mut World, now: GameTime) -> Vec<TriggerFireResult> {
    let from = world.clock();
    world.set_clock(now);
    expire_statuses(world, now);

    let due: Vec<(EntityId, usize)> = world
        .entities()
        .flat_map(|entity| {
            entity
                .triggers
                .iter()
                .enumerate()
                .filter(|(_, trigger)| trigger.is_due(now))
                .map(move |(index, _)| (entity.id, index))
        })
        .collect();

    let mut fired = Vec::with_capacity(due.len());
    for (owner, index) in due {
        let Some(action) = world
            .entity(owner)
            .and_then(|entity| entity.triggers.get(index))
            .map(|trigger| trigger.action.clone())
        else {
            continue;
        };

        let result = executor::run(
            world,
            InvocationSource::Trigger(index),
            owner,
            owner,
            vec![owner],
            &action,
        );
        let phase = settle(world, owner, index, &result, now);
        debug!(
            target: "lldm::scheduler",
            owner = %owner,
            index,
            applied = result.is_applied(),
            phase = ?phase,
            "trigger fired"
        );
        fired.push(TriggerFireResult {
            owner,
            index,
            fired_at: now,
            result,
            phase,
        });
    }

    info!(
        target: "lldm::scheduler",
        from = %from,
        to = %now,
        fired = fired.len(),
        "clock advanced"
    );
    fired
}

/// Due -> Idle | Expired after a fire.
///
/// The timestamp moves to `now` on success, and on failure unless the
/// trigger retries. An elapsed window expires the trigger either way.
fn settle(
    world: &mut World,
    owner: EntityId,
    index: usize,
    result: &ExecutionResult,
    now: GameTime,
) -> TriggerPhase {
    let Some(trigger) = world
        .entity_mut(owner)
        .and_then(|entity| entity.triggers.get_mut(index))
    else {
        return TriggerPhase::Idle;
    };
    if result.is_applied() || !trigger.retry_on_fail {
        trigger.timestamp = now;
    }
    if trigger.window_elapsed(now) {
        trigger.phase = TriggerPhase::Expired;
    }
    trigger.phase
}

fn expire_statuses(world: &mut World, now: GameTime) {
    for entity in world.entities_mut() {
        let expired = entity.statuses.remove_expired(now);
        if !expired.is_empty() {
            debug!(
                target: "lldm::scheduler",
                entity = %entity.id,
                expired = ?expired,
                "statuses expired"
            );
        }
    }
}
