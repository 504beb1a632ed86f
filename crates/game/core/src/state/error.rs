use crate::error::{ErrorSeverity, GameError};
use crate::rules::InventoryError;
use crate::state::{GameTime, VitalKind};

/// Rejection of one entity record at load time.
///
/// The offending entity is skipped; the rest of the batch still loads.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    #[error("{entity}: missing required field `{field}`")]
    MissingField { entity: String, field: String },

    #[error("{entity}: record could not be decoded: {message}")]
    Malformed { entity: String, message: String },

    #[error("{entity}: {vital} current {current} outside [0, {maximum}]")]
    VitalOutOfRange {
        entity: String,
        vital: VitalKind,
        current: i64,
        maximum: i64,
    },

    #[error("{entity}: `{field}` must not be negative (got {value})")]
    NegativeValue {
        entity: String,
        field: String,
        value: i64,
    },

    #[error("{entity}: inventory violates its rules: {source}")]
    Inventory {
        entity: String,
        #[source]
        source: InventoryError,
    },

    #[error("{entity}: trigger {index} has a zero-length frequency")]
    ZeroFrequency { entity: String, index: usize },

    #[error("{entity}: trigger {index} timestamp {timestamp:?} is ahead of the clock {clock:?}")]
    TimestampAhead {
        entity: String,
        index: usize,
        timestamp: GameTime,
        clock: GameTime,
    },

    #[error("{entity}: name already used in this world")]
    DuplicateName { entity: String },

    #[error("{entity}: unknown status template `{template}`")]
    UnknownTemplate { entity: String, template: String },

    #[error("{entity}: status `{template}` exceeds the limit of {limit} statuses")]
    StatusLimit {
        entity: String,
        template: String,
        limit: usize,
    },
}

impl DecodeError {
    /// Name of the rejected entity as it appeared in the record.
    pub fn entity(&self) -> &str {
        match self {
            Self::MissingField { entity, .. }
            | Self::Malformed { entity, .. }
            | Self::VitalOutOfRange { entity, .. }
            | Self::NegativeValue { entity, .. }
            | Self::Inventory { entity, .. }
            | Self::ZeroFrequency { entity, .. }
            | Self::TimestampAhead { entity, .. }
            | Self::DuplicateName { entity }
            | Self::UnknownTemplate { entity, .. }
            | Self::StatusLimit { entity, .. } => entity,
        }
    }
}

impl GameError for DecodeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "DECODE_MISSING_FIELD",
            Self::Malformed { .. } => "DECODE_MALFORMED",
            Self::VitalOutOfRange { .. } => "DECODE_VITAL_OUT_OF_RANGE",
            Self::NegativeValue { .. } => "DECODE_NEGATIVE_VALUE",
            Self::Inventory { .. } => "DECODE_INVENTORY",
            Self::ZeroFrequency { .. } => "DECODE_ZERO_FREQUENCY",
            Self::TimestampAhead { .. } => "DECODE_TIMESTAMP_AHEAD",
            Self::DuplicateName { .. } => "DECODE_DUPLICATE_NAME",
            Self::UnknownTemplate { .. } => "DECODE_UNKNOWN_TEMPLATE",
            Self::StatusLimit { .. } => "DECODE_STATUS_LIMIT",
        }
    }
}
