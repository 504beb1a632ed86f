//! Common error infrastructure for lldm-core.
//!
//! Domain errors (`ReferenceError`, `EffectError`, `InventoryError`, ...) live
//! next to the rules that raise them. This module only provides the shared
//! severity classification and the [`GameError`] trait they all implement.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the world is fine, the invocation may succeed later
///   (e.g. an inventory is full right now)
/// - **Validation**: the caller asked for something that does not exist
/// - **Internal**: content is inconsistent with the live world (a reference
///   that does not resolve, a malformed requirement tree)
/// - **Fatal**: world invariants are broken and execution cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error points at broken content or state.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all lldm-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and assertions in tests. The default uses the
    /// type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
