//! Errors raised while resolving and applying interactions.

use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Kind of value a reference produced or was expected to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Int,
    Text,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceError {
    #[error("malformed reference {text:?}: {reason}")]
    Malformed { text: String, reason: String },

    #[error("reference `{reference}` does not resolve")]
    UnresolvedPath { reference: String },

    #[error("reference `{reference}` re-enters itself")]
    Cycle { reference: String },

    #[error("reference `{reference}` is {found}, expected {expected}")]
    TypeMismatch {
        reference: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl GameError for ReferenceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "REFERENCE_MALFORMED",
            Self::UnresolvedPath { .. } => "REFERENCE_UNRESOLVED_PATH",
            Self::Cycle { .. } => "REFERENCE_CYCLE",
            Self::TypeMismatch { .. } => "REFERENCE_TYPE_MISMATCH",
        }
    }
}

/// A requirement tree that cannot be evaluated as authored.
///
/// Treated as an unconditional fail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequirementError {
    #[error("`or` needs at least one child")]
    EmptyOr,

    #[error("`not` takes exactly one child, got {0}")]
    NotArity(usize),

    #[error("unknown requirement kind `{0}`")]
    UnknownKind(String),

    #[error("`{0}` requirement needs a target but the invocation has none")]
    MissingSubject(String),
}

impl GameError for RequirementError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyOr => "REQUIREMENT_EMPTY_OR",
            Self::NotArity(_) => "REQUIREMENT_NOT_ARITY",
            Self::UnknownKind(_) => "REQUIREMENT_UNKNOWN_KIND",
            Self::MissingSubject(_) => "REQUIREMENT_MISSING_SUBJECT",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectError {
    #[error("effect `{effect}` writes unknown stat path `{path}` on {entity}")]
    UnknownStatPath {
        effect: String,
        entity: EntityId,
        path: String,
    },

    #[error("effect `{effect}` has no valid target {entity}")]
    InvalidTarget { effect: String, entity: EntityId },

    #[error("effect `{effect}` names unknown status template `{template}`")]
    UnknownTemplate { effect: String, template: String },

    #[error("effect `{effect}` needs a magnitude")]
    MissingMagnitude { effect: String },

    #[error("{entity} already carries {limit} statuses")]
    StatusLimit { entity: EntityId, limit: usize },
}

impl GameError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::StatusLimit { .. } => ErrorSeverity::Recoverable,
            Self::InvalidTarget { .. } => ErrorSeverity::Validation,
            _ => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStatPath { .. } => "EFFECT_UNKNOWN_STAT_PATH",
            Self::InvalidTarget { .. } => "EFFECT_INVALID_TARGET",
            Self::UnknownTemplate { .. } => "EFFECT_UNKNOWN_TEMPLATE",
            Self::MissingMagnitude { .. } => "EFFECT_MISSING_MAGNITUDE",
            Self::StatusLimit { .. } => "EFFECT_STATUS_LIMIT",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryError {
    #[error("inventory would hold {requested} items, only {allowed} allowed")]
    Capacity { requested: u64, allowed: u32 },

    #[error("item `{item}` of type `{kind}` is not allowed here")]
    TypeNotAllowed { item: String, kind: String },
}

impl GameError for InventoryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Capacity { .. } => "INVENTORY_CAPACITY",
            Self::TypeNotAllowed { .. } => "INVENTORY_TYPE_NOT_ALLOWED",
        }
    }
}

/// Anything that aborts a single invocation and rolls it back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl GameError for ExecutionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Reference(e) => e.severity(),
            Self::Effect(e) => e.severity(),
            Self::Inventory(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Reference(e) => e.error_code(),
            Self::Effect(e) => e.error_code(),
            Self::Inventory(e) => e.error_code(),
        }
    }
}
