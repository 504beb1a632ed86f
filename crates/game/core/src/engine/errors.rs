//! Caller-side errors of the rules engine.

use crate::error::{ErrorSeverity, GameError};
use crate::rules::{InteractionSlot, ReferenceError};
use crate::state::EntityId;

/// Caller defects, returned as `Err`.
///
/// Anything that goes wrong once an invocation is running is reported inside
/// its [`super::ExecutionResult`] instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("{owner} has no {slot}")]
    UnknownInteraction {
        owner: EntityId,
        slot: InteractionSlot,
    },

    /// A read-only lookup (passability) hit a broken reference.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Reference(e) => e.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "EXECUTE_UNKNOWN_ENTITY",
            Self::UnknownInteraction { .. } => "EXECUTE_UNKNOWN_INTERACTION",
            Self::Reference(e) => e.error_code(),
        }
    }
}
