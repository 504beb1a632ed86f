//! Size, terrain and per-terrain tables for movement and passability.

use crate::rules::Requirement;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Terrain {
    Land,
    Water,
    Air,
}

/// One non-negative value per terrain. Missing entries are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainTable {
    pub land: u32,
    pub water: u32,
    pub air: u32,
}

impl TerrainTable {
    pub const fn new(land: u32, water: u32, air: u32) -> Self {
        Self { land, water, air }
    }

    pub const fn get(&self, terrain: Terrain) -> u32 {
        match terrain {
            Terrain::Land => self.land,
            Terrain::Water => self.water,
            Terrain::Air => self.air,
        }
    }
}

/// How other entities may cross this one.
///
/// A cost of 0 means impassable in that terrain. Pass requirements are
/// evaluated with the mover as user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passability {
    pub cost: TerrainTable,
    pub requirements: Vec<Requirement>,
}
