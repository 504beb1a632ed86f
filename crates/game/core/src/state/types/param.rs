use std::collections::BTreeMap;

use crate::rules::Reference;

/// A free-form parameter value.
///
/// `Reference` parameters are resolved when read, which is how content builds
/// resolution chains between entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Int(i64),
    Text(String),
    Flag(bool),
    Reference(Reference),
}

/// Parameter bag keyed by name.
pub type Params = BTreeMap<String, ParamValue>;
