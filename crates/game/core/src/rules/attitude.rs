//! Cumulative attitude resolution.

use crate::state::{AttitudeVector, Entity};

/// Attitude `observer` holds towards `subject`.
///
/// Starts from the observer's default vector and adds the modifier of every
/// override whose pattern matches the subject, in declaration order. A rule's
/// clamp, if any, applies right after that rule's own contribution.
pub fn resolve(observer: &Entity, subject: &Entity) -> AttitudeVector {
    let profile = &observer.attitude;
    let mut vector = profile.default;
    for rule in profile
        .overrides
        .iter()
        .filter(|rule| rule.pattern.matches(subject))
    {
        vector.add(&rule.modifier);
        if let Some(bounds) = &rule.clamp {
            vector.clamp(bounds);
        }
    }
    vector
}
