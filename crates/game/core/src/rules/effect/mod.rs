//! Effects: single state mutations applied after requirements pass.
//!
//! Each [`Effect`] carries one closed [`Operation`]; unknown effect kinds go
//! through [`Operation::Extension`], which is recorded but mutates nothing.
mod apply;

use std::collections::BTreeMap;

pub use apply::{AppliedChange, Journal, apply, apply_in, pay_cost};

use super::reference::FieldPath;
use super::Magnitude;
use crate::state::{Duration, InventoryEntry};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatDirection {
    /// damage, drain
    Decrease,
    /// heal, restore
    Increase,
    Set,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryOp {
    /// Stack onto a matching key or append, respecting the rules.
    Add(InventoryEntry),
    /// Replace the matching key, appending when absent.
    Set(InventoryEntry),
    /// Delete the matching key; absent keys are a no-op.
    Remove(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    Stat {
        path: FieldPath,
        direction: StatDirection,
    },
    /// Attach a status named after the effect.
    Status,
    Inventory(InventoryOp),
    Extension {
        kind: String,
        data: BTreeMap<String, String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub name: String,
    /// Status template; defaults to the effect name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub template: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub magnitude: Option<Magnitude>,
    pub operation: Operation,
}

impl Effect {
    pub fn stat(
        name: impl Into<String>,
        path: FieldPath,
        direction: StatDirection,
        magnitude: Magnitude,
    ) -> Self {
        Self {
            name: name.into(),
            template: None,
            duration: None,
            magnitude: Some(magnitude),
            operation: Operation::Stat { path, direction },
        }
    }

    pub fn status(name: impl Into<String>, duration: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            template: None,
            duration,
            magnitude: None,
            operation: Operation::Status,
        }
    }

    pub fn inventory(name: impl Into<String>, op: InventoryOp) -> Self {
        Self {
            name: name.into(),
            template: None,
            duration: None,
            magnitude: None,
            operation: Operation::Inventory(op),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.name)
    }
}
