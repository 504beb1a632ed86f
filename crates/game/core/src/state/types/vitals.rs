//! Vital resource pools (hp, mp, fp).
//!
//! A [`ResourceMeter`] keeps `0 <= current <= maximum` at all times. Fields are
//! private and every mutator clamps, so no effect sequence can leave a vital
//! outside its range.

/// Identifies one of the three vital pools.
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
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VitalKind {
    Hp,
    Mp,
    Fp,
}

/// A clamped current/maximum pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "MeterRepr", into = "MeterRepr")
)]
pub struct ResourceMeter {
    current: i64,
    maximum: i64,
}

impl ResourceMeter {
    /// Builds a meter, rejecting negative values and `current > maximum`.
    pub fn try_new(current: i64, maximum: i64) -> Option<Self> {
        if maximum < 0 || current < 0 || current > maximum {
            return None;
        }
        Some(Self { current, maximum })
    }

    /// A meter filled to its maximum (negative maxima clamp to zero).
    pub fn full(maximum: i64) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: maximum,
            maximum,
        }
    }

    #[inline]
    pub const fn current(&self) -> i64 {
        self.current
    }

    #[inline]
    pub const fn maximum(&self) -> i64 {
        self.maximum
    }

    /// Adds `delta` to the current value, clamped to `[0, maximum]`.
    pub fn apply_delta(&mut self, delta: i64) -> i64 {
        self.set_current(self.current.saturating_add(delta))
    }

    pub fn set_current(&mut self, value: i64) -> i64 {
        self.current = value.clamp(0, self.maximum);
        self.current
    }

    /// Sets the maximum (floored at zero) and re-clamps the current value.
    pub fn set_maximum(&mut self, value: i64) -> i64 {
        self.maximum = value.max(0);
        self.current = self.current.min(self.maximum);
        self.maximum
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct MeterRepr {
    current: i64,
    maximum: i64,
}

#[cfg(feature = "serde")]
impl TryFrom<MeterRepr> for ResourceMeter {
    type Error = String;

    fn try_from(repr: MeterRepr) -> Result<Self, Self::Error> {
        Self::try_new(repr.current, repr.maximum).ok_or_else(|| {
            format!(
                "meter out of range: current {} maximum {}",
                repr.current, repr.maximum
            )
        })
    }
}

#[cfg(feature = "serde")]
impl From<ResourceMeter> for MeterRepr {
    fn from(meter: ResourceMeter) -> Self {
        Self {
            current: meter.current,
            maximum: meter.maximum,
        }
    }
}

/// The three vital pools of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub hp: ResourceMeter,
    pub mp: ResourceMeter,
    pub fp: ResourceMeter,
}

impl Vitals {
    pub fn get(&self, kind: VitalKind) -> &ResourceMeter {
        match kind {
            VitalKind::Hp => &self.hp,
            VitalKind::Mp => &self.mp,
            VitalKind::Fp => &self.fp,
        }
    }

    pub fn get_mut(&mut self, kind: VitalKind) -> &mut ResourceMeter {
        match kind {
            VitalKind::Hp => &mut self.hp,
            VitalKind::Mp => &mut self.mp,
            VitalKind::Fp => &mut self.fp,
        }
    }
}
