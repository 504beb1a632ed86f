use std::collections::{BTreeMap, BTreeSet};

use super::{
    AttitudeProfile, EntityId, Inventory, MatchPattern, Params, Passability, Size, StatusSet,
    TerrainTable, Vitals,
};
use crate::rules::{Interaction, InteractionSlot, Trigger};

/// A creature, item or object living in a world.
///
/// Fields are public for reading and for building fixtures; inside a world
/// they are only mutated by the rules engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    /// Unique within a world.
    pub name: String,
    pub description: String,

    // taxonomy
    pub supertype: String,
    /// The entity's `type`.
    pub kind: String,
    pub subtype: String,

    pub vitals: Vitals,
    pub size: Size,
    pub weight: i64,
    pub value: i64,
    pub exp: i64,

    pub movement: TerrainTable,
    pub passable: Passability,

    pub attributes: BTreeMap<String, i64>,
    pub skills: BTreeMap<String, i64>,
    pub specializations: BTreeMap<String, i64>,
    pub qualities: BTreeMap<String, i64>,

    pub ally: Vec<MatchPattern>,
    pub enemy: Vec<MatchPattern>,
    pub attitude: AttitudeProfile,
    pub languages: BTreeSet<String>,

    pub interactions: Vec<Interaction>,
    pub abilities: Vec<Interaction>,
    pub triggers: Vec<Trigger>,

    /// Slot name to equipped item key.
    pub equipment: BTreeMap<String, String>,
    pub bulk: i64,
    pub inventory: Inventory,

    pub memory: Vec<String>,
    pub quotes: Vec<String>,

    pub statuses: StatusSet,
    pub parameters: Params,
}

impl Entity {
    /// A blank entity with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn interaction(&self, slot: InteractionSlot) -> Option<&Interaction> {
        match slot {
            InteractionSlot::Interaction(index) => self.interactions.get(index),
            InteractionSlot::Ability(index) => self.abilities.get(index),
        }
    }
}
