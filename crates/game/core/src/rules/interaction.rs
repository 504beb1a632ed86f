//! Interactions, abilities and triggers.

use super::{Effect, Requirement};
use crate::state::{EntityId, Frequency, GameTime, Length, Params};

/// Requirements and effects for one of the three effect contexts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextBlock {
    /// Implicit AND.
    pub requirements: Vec<Requirement>,
    pub effects: Vec<Effect>,
}

impl ContextBlock {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.effects.is_empty()
    }
}

/// A named action an entity offers. Abilities share this type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Interaction {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub description: String,
    pub range: u32,
    /// Applied to each target.
    pub target: ContextBlock,
    /// Applied to the acting entity.
    pub user: ContextBlock,
    /// Applied to the entity holding the interaction.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    pub owner: ContextBlock,
    pub parameters: Params,
}

/// Addresses an interaction or an ability on its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InteractionSlot {
    Interaction(usize),
    Ability(usize),
}

impl core::fmt::Display for InteractionSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interaction(i) => write!(f, "interaction[{i}]"),
            Self::Ability(i) => write!(f, "ability[{i}]"),
        }
    }
}

/// One request to run an interaction.
///
/// `owner` holds the interaction; `user` acts with it. They differ when an
/// item's interaction is used by its wielder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Invocation {
    pub owner: EntityId,
    pub slot: InteractionSlot,
    pub user: EntityId,
    pub targets: Vec<EntityId>,
}

impl Invocation {
    /// The owner acts on its own behalf.
    pub fn by_owner(owner: EntityId, slot: InteractionSlot, targets: Vec<EntityId>) -> Self {
        Self {
            owner,
            slot,
            user: owner,
            targets,
        }
    }
}

/// Persisted part of the trigger state machine.
///
/// `Due` and `Firing` only exist inside a single clock advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerPhase {
    #[default]
    Idle,
    Expired,
}

/// A time-driven interaction fired by the scheduler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    pub frequency: Frequency,
    pub length: Length,
    /// Last time the trigger fired or was checked. Never ahead of the clock.
    pub timestamp: GameTime,
    /// Start of the bounded `length` window.
    pub activated_at: GameTime,
    pub retry_on_fail: bool,
    pub phase: TriggerPhase,
    pub action: Interaction,
}

impl Trigger {
    pub fn new(frequency: Frequency, length: Length, action: Interaction) -> Self {
        Self {
            frequency,
            length,
            timestamp: GameTime::ZERO,
            activated_at: GameTime::ZERO,
            retry_on_fail: false,
            phase: TriggerPhase::Idle,
            action,
        }
    }

    /// Activates the trigger at `at`: both the timestamp and the window start.
    pub fn starting_at(mut self, at: GameTime) -> Self {
        self.timestamp = at;
        self.activated_at = at;
        self
    }

    pub fn retrying(mut self) -> Self {
        self.retry_on_fail = true;
        self
    }

    /// Due when a full interval has elapsed since the timestamp.
    pub fn is_due(&self, now: GameTime) -> bool {
        self.phase == TriggerPhase::Idle && now.since(self.timestamp) >= self.frequency.interval_secs()
    }

    /// True once `length × frequency` has passed since activation.
    pub fn window_elapsed(&self, now: GameTime) -> bool {
        self.length
            .span_secs(self.frequency)
            .is_some_and(|span| now.since(self.activated_at) >= span)
    }
}
