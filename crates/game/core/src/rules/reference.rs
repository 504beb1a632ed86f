//! Typed reference expressions.
//!
//! A reference has the textual shape `scope:path`, optionally wrapped as
//! `reference(scope:path)`. Parsing produces a [`Reference`] whose path is a
//! closed enum over the fields an entity or the world exposes, so resolution
//! never goes through reflection or string lookups on struct fields.

use std::str::FromStr;

use super::ReferenceError;
use crate::rules::error::ValueKind;
use crate::state::{Terrain, VitalKind};

/// Where a reference starts.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// The entity holding the interaction (`self`).
    #[strum(to_string = "self")]
    Owner,
    Target,
    User,
    World,
    /// The invoking interaction's parameter bag.
    Parameter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VitalPart {
    Current,
    Maximum,
}

/// A field on an entity's exposed state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum FieldPath {
    Name,
    Supertype,
    Type,
    Subtype,
    Size,
    Weight,
    Value,
    Exp,
    Bulk,
    Vital(VitalKind, VitalPart),
    Attribute(String),
    Skill(String),
    Specialization(String),
    Quality(String),
    Move(Terrain),
    Passable(Terrain),
    Language(String),
    Status(String),
    Inventory(String),
    Parameter(String),
}

impl FieldPath {
    fn parse(path: &str) -> Result<Self, String> {
        let simple = match path {
            "name" => Some(Self::Name),
            "supertype" => Some(Self::Supertype),
            "type" => Some(Self::Type),
            "subtype" => Some(Self::Subtype),
            "size" => Some(Self::Size),
            "weight" => Some(Self::Weight),
            "value" => Some(Self::Value),
            "exp" => Some(Self::Exp),
            "bulk" => Some(Self::Bulk),
            _ => None,
        };
        if let Some(field) = simple {
            return Ok(field);
        }

        if let Some((part, vital)) = path.split_once('_') {
            let part = match part {
                "cur" => Some(VitalPart::Current),
                "max" => Some(VitalPart::Maximum),
                _ => None,
            };
            if let (Some(part), Ok(kind)) = (part, vital.parse::<VitalKind>()) {
                return Ok(Self::Vital(kind, part));
            }
        }

        let (prefix, key) = path
            .split_once('.')
            .ok_or_else(|| format!("unknown field `{path}`"))?;
        if key.is_empty() {
            return Err(format!("`{prefix}` needs a key"));
        }
        let key_owned = key.to_owned();
        let terrain = || {
            key.parse::<Terrain>()
                .map_err(|_| format!("unknown terrain `{key}`"))
        };
        match prefix {
            "attribute" => Ok(Self::Attribute(key_owned)),
            "skill" => Ok(Self::Skill(key_owned)),
            "specialization" => Ok(Self::Specialization(key_owned)),
            "quality" => Ok(Self::Quality(key_owned)),
            "move" => terrain().map(Self::Move),
            "passable" => terrain().map(Self::Passable),
            "language" => Ok(Self::Language(key_owned)),
            "status" => Ok(Self::Status(key_owned)),
            "inventory" => Ok(Self::Inventory(key_owned)),
            "parameter" => Ok(Self::Parameter(key_owned)),
            _ => Err(format!("unknown field group `{prefix}`")),
        }
    }
}

impl core::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Supertype => f.write_str("supertype"),
            Self::Type => f.write_str("type"),
            Self::Subtype => f.write_str("subtype"),
            Self::Size => f.write_str("size"),
            Self::Weight => f.write_str("weight"),
            Self::Value => f.write_str("value"),
            Self::Exp => f.write_str("exp"),
            Self::Bulk => f.write_str("bulk"),
            Self::Vital(kind, VitalPart::Current) => write!(f, "cur_{kind}"),
            Self::Vital(kind, VitalPart::Maximum) => write!(f, "max_{kind}"),
            Self::Attribute(k) => write!(f, "attribute.{k}"),
            Self::Skill(k) => write!(f, "skill.{k}"),
            Self::Specialization(k) => write!(f, "specialization.{k}"),
            Self::Quality(k) => write!(f, "quality.{k}"),
            Self::Move(t) => write!(f, "move.{t}"),
            Self::Passable(t) => write!(f, "passable.{t}"),
            Self::Language(k) => write!(f, "language.{k}"),
            Self::Status(k) => write!(f, "status.{k}"),
            Self::Inventory(k) => write!(f, "inventory.{k}"),
            Self::Parameter(k) => write!(f, "parameter.{k}"),
        }
    }
}

impl FromStr for FieldPath {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text.trim()).map_err(|reason| ReferenceError::Malformed {
            text: text.to_owned(),
            reason,
        })
    }
}

impl TryFrom<String> for FieldPath {
    type Error = ReferenceError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

/// A field of the world itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldField {
    Clock,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Parameter(String),
}

impl WorldField {
    fn parse(path: &str) -> Result<Self, String> {
        match path {
            "clock" => Ok(Self::Clock),
            "clock.year" => Ok(Self::Year),
            "clock.month" => Ok(Self::Month),
            "clock.day" => Ok(Self::Day),
            "clock.hour" => Ok(Self::Hour),
            "clock.minute" => Ok(Self::Minute),
            _ => match path.split_once('.') {
                Some(("parameter", key)) if !key.is_empty() => Ok(Self::Parameter(key.to_owned())),
                _ => Err(format!("unknown world field `{path}`")),
            },
        }
    }
}

impl core::fmt::Display for WorldField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Clock => f.write_str("clock"),
            Self::Year => f.write_str("clock.year"),
            Self::Month => f.write_str("clock.month"),
            Self::Day => f.write_str("clock.day"),
            Self::Hour => f.write_str("clock.hour"),
            Self::Minute => f.write_str("clock.minute"),
            Self::Parameter(k) => write!(f, "parameter.{k}"),
        }
    }
}

/// Path part of a reference, typed by its scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefPath {
    Entity(FieldPath),
    World(WorldField),
    Parameter(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Reference {
    scope: Scope,
    path: RefPath,
}

impl Reference {
    /// Reference to a field on an entity scope (`self`, `target`, `user`).
    pub fn entity(scope: Scope, field: FieldPath) -> Self {
        Self {
            scope,
            path: RefPath::Entity(field),
        }
    }

    pub fn world(field: WorldField) -> Self {
        Self {
            scope: Scope::World,
            path: RefPath::World(field),
        }
    }

    pub fn parameter(key: impl Into<String>) -> Self {
        Self {
            scope: Scope::Parameter,
            path: RefPath::Parameter(key.into()),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn path(&self) -> &RefPath {
        &self.path
    }
}

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| ReferenceError::Malformed {
            text: text.to_owned(),
            reason,
        };

        let mut body = text.trim();
        if let Some(inner) = body.strip_prefix("reference(") {
            body = inner
                .strip_suffix(')')
                .ok_or_else(|| malformed("unclosed `reference(`".to_owned()))?
                .trim();
        }

        let (scope, path) = body
            .split_once(':')
            .ok_or_else(|| malformed("expected `scope:path`".to_owned()))?;
        let scope = scope
            .trim()
            .parse::<Scope>()
            .map_err(|_| malformed(format!("unknown scope `{}`", scope.trim())))?;
        let path = path.trim();

        let path = match scope {
            Scope::Owner | Scope::Target | Scope::User => {
                RefPath::Entity(FieldPath::parse(path).map_err(malformed)?)
            }
            Scope::World => RefPath::World(WorldField::parse(path).map_err(malformed)?),
            Scope::Parameter if path.is_empty() => {
                return Err(malformed("parameter scope needs a key".to_owned()));
            }
            Scope::Parameter => RefPath::Parameter(path.to_owned()),
        };

        Ok(Self { scope, path })
    }
}

impl core::fmt::Display for Reference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.path {
            RefPath::Entity(field) => write!(f, "{}:{field}", self.scope),
            RefPath::World(field) => write!(f, "{}:{field}", self.scope),
            RefPath::Parameter(key) => write!(f, "{}:{key}", self.scope),
        }
    }
}

impl TryFrom<String> for Reference {
    type Error = ReferenceError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.to_string()
    }
}

/// A resolved value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i64),
    Text(String),
    Flag(bool),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Text(_) => ValueKind::Text,
            Self::Flag(_) => ValueKind::Flag,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Non-zero numbers, `true` and non-empty text are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(v) => *v != 0,
            Self::Text(s) => !s.is_empty(),
            Self::Flag(b) => *b,
        }
    }
}
