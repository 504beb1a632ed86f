//! Typed entity records as handed over by a structured-data decoder.
//!
//! Records mirror the authoring schema (`type`, `move`, `attribute`, ...) and
//! are checked by [`load_entity`] before they become [`Entity`] values.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    AttitudeProfile, DecodeError, Entity, Frequency, GameTime, Inventory, InventoryEntry,
    InventoryRules, Length, MatchPattern, Params, Passability, ResourceMeter, Size, StatusSet,
    TerrainTable, VitalKind, Vitals,
};
use crate::rules::{Interaction, Requirement, Trigger};

/// Vital pool as authored. A missing `cur` starts full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VitalRecord {
    pub max: i64,
    pub cur: Option<i64>,
}

impl VitalRecord {
    pub const fn full(max: i64) -> Self {
        Self { max, cur: None }
    }
}

/// Trigger as authored; activation bookkeeping is filled in on load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerRecord {
    pub frequency: Frequency,
    #[cfg_attr(feature = "serde", serde(default))]
    pub length: Length,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: GameTime,
    #[cfg_attr(feature = "serde", serde(default))]
    pub retry_on_fail: bool,
    pub action: Interaction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityRecord {
    pub name: String,
    pub description: String,
    pub supertype: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub subtype: String,

    pub hp: VitalRecord,
    pub mp: VitalRecord,
    pub fp: VitalRecord,

    pub size: Size,
    pub weight: i64,
    pub value: i64,
    pub exp: i64,

    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub movement: TerrainTable,
    pub passable: TerrainTable,
    pub pass_requirements: Vec<Requirement>,

    pub attribute: BTreeMap<String, i64>,
    pub skill: BTreeMap<String, i64>,
    pub specialization: BTreeMap<String, i64>,
    pub quality: BTreeMap<String, i64>,

    pub ally: Vec<MatchPattern>,
    pub enemy: Vec<MatchPattern>,
    pub attitude: AttitudeProfile,
    pub language: BTreeSet<String>,

    pub interaction: Vec<Interaction>,
    pub ability: Vec<Interaction>,
    pub trigger: Vec<TriggerRecord>,

    pub equipment: BTreeMap<String, String>,
    pub bulk: i64,
    pub inventory: Vec<InventoryEntry>,
    pub inventory_rules: InventoryRules,

    pub memory: Vec<String>,
    pub quotes: Vec<String>,

    /// Status templates active at load.
    pub status: Vec<String>,
    pub parameters: Params,
}

impl EntityRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn meter(entity: &str, kind: VitalKind, record: VitalRecord) -> Result<ResourceMeter, DecodeError> {
    let current = record.cur.unwrap_or(record.max);
    ResourceMeter::try_new(current, record.max).ok_or_else(|| DecodeError::VitalOutOfRange {
        entity: entity.to_owned(),
        vital: kind,
        current,
        maximum: record.max,
    })
}

fn non_negative(entity: &str, field: &str, value: i64) -> Result<i64, DecodeError> {
    if value < 0 {
        return Err(DecodeError::NegativeValue {
            entity: entity.to_owned(),
            field: field.to_owned(),
            value,
        });
    }
    Ok(value)
}

/// Validates a record and converts it into an entity.
///
/// The returned entity has no id and no statuses yet; both are assigned when
/// it joins a world (see [`super::World::load_entity`]).
pub fn load_entity(record: EntityRecord) -> Result<Entity, DecodeError> {
    let name = record.name.trim().to_owned();
    if name.is_empty() {
        return Err(DecodeError::MissingField {
            entity: "<unnamed>".to_owned(),
            field: "name".to_owned(),
        });
    }

    let vitals = Vitals {
        hp: meter(&name, VitalKind::Hp, record.hp)?,
        mp: meter(&name, VitalKind::Mp, record.mp)?,
        fp: meter(&name, VitalKind::Fp, record.fp)?,
    };
    let weight = non_negative(&name, "weight", record.weight)?;
    let bulk = non_negative(&name, "bulk", record.bulk)?;

    let inventory = Inventory::with_items(record.inventory_rules, record.inventory).map_err(
        |source| DecodeError::Inventory {
            entity: name.clone(),
            source,
        },
    )?;

    let mut triggers = Vec::with_capacity(record.trigger.len());
    for (index, trigger) in record.trigger.into_iter().enumerate() {
        if trigger.frequency.interval_secs() == 0 {
            return Err(DecodeError::ZeroFrequency {
                entity: name.clone(),
                index,
            });
        }
        let mut loaded = Trigger::new(trigger.frequency, trigger.length, trigger.action)
            .starting_at(trigger.timestamp);
        loaded.retry_on_fail = trigger.retry_on_fail;
        triggers.push(loaded);
    }

    Ok(Entity {
        id: Default::default(),
        name,
        description: record.description,
        supertype: record.supertype,
        kind: record.kind,
        subtype: record.subtype,
        vitals,
        size: record.size,
        weight,
        value: record.value,
        exp: record.exp,
        movement: record.movement,
        passable: Passability {
            cost: record.passable,
            requirements: record.pass_requirements,
        },
        attributes: record.attribute,
        skills: record.skill,
        specializations: record.specialization,
        qualities: record.quality,
        ally: record.ally,
        enemy: record.enemy,
        attitude: record.attitude,
        languages: record.language,
        interactions: record.interaction,
        abilities: record.ability,
        triggers,
        equipment: record.equipment,
        bulk,
        inventory,
        memory: record.memory,
        quotes: record.quotes,
        statuses: StatusSet::empty(),
        parameters: record.parameters,
    })
}
