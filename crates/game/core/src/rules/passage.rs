//! Single-cell passability lookup.

use std::cell::Cell;

use super::context::Scene;
use super::requirement;
use super::{ReferenceError, TraceNode};
use crate::state::{Entity, EntityId, Params, Terrain, World};

/// Why a mover cannot cross an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Blocker {
    /// The obstacle's cost for this terrain is zero.
    Impassable,
    /// The obstacle's pass requirements failed for this mover.
    Requirements,
    /// The mover has no speed in this terrain.
    NoSpeed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Passage {
    Cost(u32),
    Blocked(Blocker),
}

impl Passage {
    pub fn is_passable(&self) -> bool {
        matches!(self, Self::Cost(_))
    }
}

/// Cost for `mover` to cross `obstacle` in `terrain`.
///
/// Pass requirements are evaluated with the obstacle as `self` and the mover
/// as `user` and `target`. The lookup reads only.
pub fn passage_cost(
    world: &World,
    obstacle: &Entity,
    mover: &Entity,
    terrain: Terrain,
) -> Result<(Passage, Option<TraceNode>), ReferenceError> {
    let cost = obstacle.passable.cost.get(terrain);
    if cost == 0 {
        return Ok((Passage::Blocked(Blocker::Impassable), None));
    }
    if mover.movement.get(terrain) == 0 {
        return Ok((Passage::Blocked(Blocker::NoSpeed), None));
    }
    if obstacle.passable.requirements.is_empty() {
        return Ok((Passage::Cost(cost), None));
    }

    let params = Params::new();
    let rolls = Cell::new(0);
    let scene = Scene::new(obstacle.id, mover.id, world.nonce(), &params, &rolls);
    let ctx = scene.context(world, mover.id, Some(mover.id));
    let evaluation = requirement::evaluate(&obstacle.passable.requirements, "passable", &ctx)?;
    let verdict = if evaluation.passed {
        Passage::Cost(cost)
    } else {
        Passage::Blocked(Blocker::Requirements)
    };
    Ok((verdict, Some(evaluation.trace)))
}

/// Id-based convenience over [`passage_cost`]; `None` when either id is unknown.
pub fn passage_between(
    world: &World,
    obstacle: EntityId,
    mover: EntityId,
    terrain: Terrain,
) -> Option<Result<(Passage, Option<TraceNode>), ReferenceError>> {
    let obstacle = world.entity(obstacle)?;
    let mover = world.entity(mover)?;
    Some(passage_cost(world, obstacle, mover, terrain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Requirement;
    use crate::state::{EntityRecord, TerrainTable};

    fn world() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::default();

        let mut door = EntityRecord::named("door");
        door.passable = TerrainTable::new(2, 0, 0);
        door.pass_requirements = vec![Requirement::Flag(
            "user:inventory.key".parse().unwrap(),
        )];
        let door = world.load_entity(door).unwrap();

        let mut thief = EntityRecord::named("thief");
        thief.movement = TerrainTable::new(6, 2, 0);
        thief.inventory = vec![crate::state::InventoryEntry::new("key", "key", 1)];
        let thief = world.load_entity(thief).unwrap();

        let mut ox = EntityRecord::named("ox");
        ox.movement = TerrainTable::new(4, 0, 0);
        let ox = world.load_entity(ox).unwrap();

        (world, door, thief, ox)
    }

    fn lookup(world: &World, obstacle: EntityId, mover: EntityId, terrain: Terrain) -> Passage {
        passage_between(world, obstacle, mover, terrain)
            .unwrap()
            .unwrap()
            .0
    }

    #[test]
    fn requirements_gate_passage() {
        let (world, door, thief, ox) = world();
        assert_eq!(lookup(&world, door, thief, Terrain::Land), Passage::Cost(2));
        assert_eq!(
            lookup(&world, door, ox, Terrain::Land),
            Passage::Blocked(Blocker::Requirements)
        );
    }

    #[test]
    fn zero_cost_or_speed_blocks() {
        let (world, door, thief, _) = world();
        assert_eq!(
            lookup(&world, door, thief, Terrain::Water),
            Passage::Blocked(Blocker::Impassable)
        );

        let mut pond = EntityRecord::named("pond");
        pond.passable = TerrainTable::new(0, 1, 0);
        let mut world = world;
        let pond = world.load_entity(pond).unwrap();
        let ox = world.id_of("ox").unwrap();
        assert_eq!(
            lookup(&world, pond, ox, Terrain::Water),
            Passage::Blocked(Blocker::NoSpeed)
        );
    }
}
