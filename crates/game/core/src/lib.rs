//! Deterministic interaction resolution for role-playing game entities.
//!
//! `lldm-core` owns the entity data model ([`state`]) and every rule that reads
//! or mutates it ([`rules`]). All mutation flows through [`engine::RulesEngine`],
//! which serializes invocations on a `&mut World` borrow: requirement trees are
//! evaluated read-only, then the invocation's effects commit atomically or not
//! at all. The crate performs no I/O; hosts hand it typed records.
pub mod config;
pub mod engine;
pub mod error;
pub mod rng;
pub mod rules;
pub mod state;

pub use config::EngineConfig;
pub use engine::{
    ExecuteError, ExecutionResult, ExecutionStatus, InvocationSource, RulesEngine,
    TriggerFireResult,
};
pub use error::{ErrorSeverity, GameError};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use rules::{
    AppliedChange, Combine, ContextBlock, Effect, EffectError, ExecutionError, Interaction,
    InteractionSlot, InventoryError, InventoryOp, Invocation, Magnitude, MagnitudeBase,
    Operation, Outcome, Passage, Reference, ReferenceError, Requirement, RequirementError,
    StatDirection, TraceNode, Trigger, TriggerPhase, Value,
};
pub use state::{
    AttitudeVector, DecodeError, Duration, Entity, EntityId, EntityRecord, Frequency, GameTime,
    Inventory, InventoryEntry, InventoryRules, Length, LoadReport, MatchPattern, ParamValue,
    Params, ResourceMeter, Size, StatusInstance, Terrain, TerrainTable, TriggerRecord,
    VitalKind, VitalRecord, World,
};
