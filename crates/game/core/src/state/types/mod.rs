//! Value types composing an entity and the world clock.
mod common;
mod entity;
mod inventory;
mod param;
mod physical;
mod social;
mod status;
mod time;
mod vitals;

pub use common::EntityId;
pub use entity::Entity;
pub use inventory::{Inventory, InventoryEntry, InventoryRules};
pub use param::{ParamValue, Params};
pub use physical::{Passability, Size, Terrain, TerrainTable};
pub use social::{
    AttitudeClamp, AttitudeOverride, AttitudeProfile, AttitudeVector, MatchPattern,
    PatternParseError,
};
pub use status::{StatusAttach, StatusInstance, StatusSet};
pub use time::{Duration, Frequency, GameTime, Length};
pub use vitals::{ResourceMeter, VitalKind, Vitals};
