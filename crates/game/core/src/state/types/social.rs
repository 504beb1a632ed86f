//! Social relationships: match patterns, ally/enemy lists and attitudes.

use std::str::FromStr;

use super::Entity;

/// Selects entities by taxonomy, quality or name.
///
/// Textual form is `"*"` or `"<key>:<value>"` where key is one of `name`,
/// `quality`, `supertype`, `type`, `subtype`. A value of `"*"` matches any
/// entity that has that key populated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum MatchPattern {
    Any,
    Name(String),
    Quality(String),
    Supertype(String),
    Type(String),
    Subtype(String),
}

const WILDCARD: &str = "*";

fn value_matches(pattern: &str, actual: &str) -> bool {
    if pattern == WILDCARD {
        !actual.is_empty()
    } else {
        pattern == actual
    }
}

impl MatchPattern {
    /// True when `entity` satisfies this pattern.
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::Any => true,
            Self::Name(name) => value_matches(name, &entity.name),
            Self::Quality(quality) if quality == WILDCARD => !entity.qualities.is_empty(),
            Self::Quality(quality) => entity.qualities.contains_key(quality),
            Self::Supertype(value) => value_matches(value, &entity.supertype),
            Self::Type(value) => value_matches(value, &entity.kind),
            Self::Subtype(value) => value_matches(value, &entity.subtype),
        }
    }

    /// True when a relationship-list entry (`self`) covers a requested pattern.
    ///
    /// Either side being [`MatchPattern::Any`] or a `"*"` value of the same key
    /// counts as a match.
    pub fn covers(&self, requested: &MatchPattern) -> bool {
        match (self, requested) {
            (Self::Any, _) | (_, Self::Any) => true,
            _ => match (self.key_value(), requested.key_value()) {
                (Some((key_a, a)), Some((key_b, b))) => {
                    key_a == key_b && (a == WILDCARD || b == WILDCARD || a == b)
                }
                _ => false,
            },
        }
    }

    fn key_value(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::Any => None,
            Self::Name(v) => Some(("name", v)),
            Self::Quality(v) => Some(("quality", v)),
            Self::Supertype(v) => Some(("supertype", v)),
            Self::Type(v) => Some(("type", v)),
            Self::Subtype(v) => Some(("subtype", v)),
        }
    }
}

/// Returned when a pattern string has an unknown key or no value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid match pattern {0:?}")]
pub struct PatternParseError(pub String);

impl FromStr for MatchPattern {
    type Err = PatternParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text == WILDCARD {
            return Ok(Self::Any);
        }
        let (key, value) = text
            .split_once(':')
            .ok_or_else(|| PatternParseError(text.to_owned()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(PatternParseError(text.to_owned()));
        }
        let value = value.to_owned();
        match key.trim() {
            "name" => Ok(Self::Name(value)),
            "quality" => Ok(Self::Quality(value)),
            "supertype" => Ok(Self::Supertype(value)),
            "type" => Ok(Self::Type(value)),
            "subtype" => Ok(Self::Subtype(value)),
            _ => Err(PatternParseError(text.to_owned())),
        }
    }
}

impl core::fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.key_value() {
            None => f.write_str(WILDCARD),
            Some((key, value)) => write!(f, "{key}:{value}"),
        }
    }
}

impl TryFrom<String> for MatchPattern {
    type Error = PatternParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<MatchPattern> for String {
    fn from(pattern: MatchPattern) -> Self {
        pattern.to_string()
    }
}

/// Social-disposition scalars one entity holds towards another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttitudeVector {
    pub disposition: i64,
    pub trust: i64,
    pub confidence: i64,
    pub respect: i64,
    pub obligation: i64,
    pub intimacy: i64,
}

impl AttitudeVector {
    /// Component-wise saturating addition.
    pub fn add(&mut self, other: &AttitudeVector) {
        self.disposition = self.disposition.saturating_add(other.disposition);
        self.trust = self.trust.saturating_add(other.trust);
        self.confidence = self.confidence.saturating_add(other.confidence);
        self.respect = self.respect.saturating_add(other.respect);
        self.obligation = self.obligation.saturating_add(other.obligation);
        self.intimacy = self.intimacy.saturating_add(other.intimacy);
    }

    pub fn clamp(&mut self, bounds: &AttitudeClamp) {
        let (lo, hi) = (bounds.min, bounds.max.max(bounds.min));
        for value in [
            &mut self.disposition,
            &mut self.trust,
            &mut self.confidence,
            &mut self.respect,
            &mut self.obligation,
            &mut self.intimacy,
        ] {
            *value = (*value).clamp(lo, hi);
        }
    }
}

/// Inclusive bounds applied to every attitude component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttitudeClamp {
    pub min: i64,
    pub max: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttitudeOverride {
    pub pattern: MatchPattern,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifier: AttitudeVector,
    #[cfg_attr(feature = "serde", serde(default))]
    pub clamp: Option<AttitudeClamp>,
}

/// Default attitude plus ordered override rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttitudeProfile {
    pub default: AttitudeVector,
    pub overrides: Vec<AttitudeOverride>,
}
