//! Statuses attached to an entity.
//!
//! A status is a tagged sub-entity instantiated from a world template. It
//! stores `expires_at` rather than a remaining duration, so several clock
//! advances at once still expire it exactly when `clock >= expires_at`.

use super::{Entity, GameTime};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub tag: String,
    /// Template name the sub-entity was instantiated from.
    pub template: String,
    pub applied_at: GameTime,
    /// `None` never expires.
    pub expires_at: Option<GameTime>,
    pub entity: Box<Entity>,
}

impl StatusInstance {
    pub fn is_expired(&self, now: GameTime) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Result of attaching a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusAttach {
    Added,
    /// Tag was already active; expiry moved to the later of the two.
    Refreshed,
    /// Set is at capacity; nothing changed.
    Full,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSet {
    entries: Vec<StatusInstance>,
}

impl StatusSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|status| status.tag == tag)
    }

    pub fn get(&self, tag: &str) -> Option<&StatusInstance> {
        self.entries.iter().find(|status| status.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusInstance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a status, or extends an active one with the same tag.
    pub fn attach(&mut self, status: StatusInstance, capacity: usize) -> StatusAttach {
        if let Some(existing) = self.entries.iter_mut().find(|s| s.tag == status.tag) {
            existing.expires_at = match (existing.expires_at, status.expires_at) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            };
            return StatusAttach::Refreshed;
        }

        if self.entries.len() >= capacity {
            return StatusAttach::Full;
        }
        self.entries.push(status);
        StatusAttach::Added
    }

    pub fn remove(&mut self, tag: &str) -> Option<StatusInstance> {
        let index = self.entries.iter().position(|status| status.tag == tag)?;
        Some(self.entries.remove(index))
    }

    /// Drops every status expired at `now` and returns their tags.
    pub fn remove_expired(&mut self, now: GameTime) -> Vec<String> {
        let mut expired = Vec::new();
        self.entries.retain(|status| {
            if status.is_expired(now) {
                expired.push(status.tag.clone());
                false
            } else {
                true
            }
        });
        expired
    }
}
