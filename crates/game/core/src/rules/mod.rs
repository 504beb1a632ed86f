//! Interaction rules: references, magnitudes, requirements, effects,
//! attitudes and passability.
//!
//! Everything here is either read-only over a `&World` (resolution,
//! evaluation, attitude, passage) or mutates through a [`Journal`] so the
//! caller can roll back (effects).
pub mod attitude;
pub mod context;
pub mod effect;
mod error;
mod interaction;
pub mod magnitude;
pub mod passage;
pub mod reference;
pub mod requirement;
mod trace;

pub use context::{EvalContext, Scene};
pub use effect::{AppliedChange, Effect, InventoryOp, Journal, Operation, StatDirection};
pub use error::{
    EffectError, ExecutionError, InventoryError, ReferenceError, RequirementError, ValueKind,
};
pub use interaction::{
    ContextBlock, Interaction, InteractionSlot, Invocation, Trigger, TriggerPhase,
};
pub use magnitude::{Combine, Magnitude, MagnitudeBase};
pub use passage::{Blocker, Passage};
pub use reference::{FieldPath, RefPath, Reference, Scope, Value, VitalPart, WorldField};
pub use requirement::{Evaluation, Outcome, Requirement, ResourceCost, TestSpec};
pub use trace::TraceNode;
