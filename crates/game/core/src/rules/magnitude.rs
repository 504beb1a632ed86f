//! Magnitude evaluation: base value, modifier, combination rule.

use super::context::EvalContext;
use super::{Reference, ReferenceError};

/// Where the base number comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MagnitudeBase {
    Value(i64),
    Reference(Reference),
}

/// How `pre_mod` combines with the base.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combine {
    /// `base + pre_mod`
    #[default]
    Additive,
    /// `base * pre_mod / 100` (pre_mod is a percentage)
    Multiplicative,
    /// `pre_mod`, ignoring the base
    Override,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Magnitude {
    pub base: MagnitudeBase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pre_mod: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub combine: Combine,
    /// Turn the combined value into a dice pool and roll it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roll: bool,
    /// Skip the clamp at zero.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allow_negative: bool,
}

impl Magnitude {
    pub fn fixed(value: i64) -> Self {
        Self::from_base(MagnitudeBase::Value(value))
    }

    pub fn of(reference: Reference) -> Self {
        Self::from_base(MagnitudeBase::Reference(reference))
    }

    fn from_base(base: MagnitudeBase) -> Self {
        Self {
            base,
            pre_mod: 0,
            combine: Combine::Additive,
            roll: false,
            allow_negative: false,
        }
    }

    pub fn with_modifier(mut self, combine: Combine, pre_mod: i64) -> Self {
        self.combine = combine;
        self.pre_mod = pre_mod;
        self
    }

    pub fn rolled(mut self) -> Self {
        self.roll = true;
        self
    }

    pub fn signed(mut self) -> Self {
        self.allow_negative = true;
        self
    }

    /// Base combined with the modifier, before any roll or clamp.
    pub fn score(&self, ctx: &EvalContext<'_>) -> Result<i64, ReferenceError> {
        let base = match &self.base {
            MagnitudeBase::Value(v) => *v,
            MagnitudeBase::Reference(reference) => ctx.resolve_int(reference)?,
        };

        Ok(match self.combine {
            Combine::Additive => base.saturating_add(self.pre_mod),
            Combine::Multiplicative => base.saturating_mul(self.pre_mod) / 100,
            Combine::Override => self.pre_mod,
        })
    }

    /// Picks the candidate with the highest [`score`](Self::score). Ties go to
    /// the earlier one. Nothing is rolled.
    pub fn best_of<'m>(
        first: &'m Magnitude,
        rest: &'m [Magnitude],
        ctx: &EvalContext<'_>,
    ) -> Result<&'m Magnitude, ReferenceError> {
        let mut best = (first, first.score(ctx)?);
        for candidate in rest {
            let score = candidate.score(ctx)?;
            if score > best.1 {
                best = (candidate, score);
            }
        }
        Ok(best.0)
    }

    /// Evaluates against the context. Reads only; dice use the scene counter.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<i64, ReferenceError> {
        let combined = self.score(ctx)?;

        let value = if self.roll {
            ctx.roll_pool(combined)
        } else {
            combined
        };

        Ok(if self.allow_negative { value } else { value.max(0) })
    }
}
