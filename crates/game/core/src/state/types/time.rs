//! Game clock, recurrence frequencies and durations.
//!
//! Time is counted in whole game seconds. The calendar is the fixed game
//! calendar: 60-second minutes, 60-minute hours, 24-hour days, 30-day months
//! and 12-month years. A week is seven days.

/// Absolute game time in seconds since the world epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub u64);

impl GameTime {
    pub const SECONDS_PER_MINUTE: u64 = 60;
    pub const SECONDS_PER_HOUR: u64 = 60 * Self::SECONDS_PER_MINUTE;
    pub const SECONDS_PER_DAY: u64 = 24 * Self::SECONDS_PER_HOUR;
    pub const SECONDS_PER_WEEK: u64 = 7 * Self::SECONDS_PER_DAY;
    pub const SECONDS_PER_MONTH: u64 = 30 * Self::SECONDS_PER_DAY;
    pub const SECONDS_PER_YEAR: u64 = 12 * Self::SECONDS_PER_MONTH;

    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn seconds(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn saturating_add(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is in the future.
    #[inline]
    pub const fn since(self, earlier: GameTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub const fn year(self) -> u64 {
        self.0 / Self::SECONDS_PER_YEAR
    }

    /// Month within the year, zero-based.
    pub const fn month(self) -> u64 {
        (self.0 % Self::SECONDS_PER_YEAR) / Self::SECONDS_PER_MONTH
    }

    /// Day within the month, zero-based.
    pub const fn day(self) -> u64 {
        (self.0 % Self::SECONDS_PER_MONTH) / Self::SECONDS_PER_DAY
    }

    pub const fn hour(self) -> u64 {
        (self.0 % Self::SECONDS_PER_DAY) / Self::SECONDS_PER_HOUR
    }

    pub const fn minute(self) -> u64 {
        (self.0 % Self::SECONDS_PER_HOUR) / Self::SECONDS_PER_MINUTE
    }
}

impl core::fmt::Display for GameTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Y{} M{} D{} {:02}:{:02}",
            self.year(),
            self.month() + 1,
            self.day() + 1,
            self.hour(),
            self.minute()
        )
    }
}

/// Recurrence interval of a trigger or unit of an effect duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    Second,
    Minute,
    #[default]
    Hour,
    Day,
    Week,
    Month,
    Year,
    /// Custom interval in seconds.
    Every(u64),
}

impl Frequency {
    pub const fn interval_secs(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => GameTime::SECONDS_PER_MINUTE,
            Self::Hour => GameTime::SECONDS_PER_HOUR,
            Self::Day => GameTime::SECONDS_PER_DAY,
            Self::Week => GameTime::SECONDS_PER_WEEK,
            Self::Month => GameTime::SECONDS_PER_MONTH,
            Self::Year => GameTime::SECONDS_PER_YEAR,
            Self::Every(secs) => secs,
        }
    }
}

/// Number of frequency intervals something lasts. `"*"` in content is
/// [`Length::Indefinite`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LengthRepr", into = "LengthRepr")
)]
pub enum Length {
    #[default]
    Indefinite,
    Count(u32),
}

impl Length {
    /// Total span in seconds for the given unit, `None` when indefinite.
    pub fn span_secs(self, frequency: Frequency) -> Option<u64> {
        match self {
            Self::Indefinite => None,
            Self::Count(n) => Some(u64::from(n).saturating_mul(frequency.interval_secs())),
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Count(u32),
    Text(String),
}

#[cfg(feature = "serde")]
impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Count(n) => Ok(Self::Count(n)),
            LengthRepr::Text(text) if text.trim() == "*" => Ok(Self::Indefinite),
            LengthRepr::Text(text) => text
                .trim()
                .parse::<u32>()
                .map(Self::Count)
                .map_err(|_| format!("length must be a count or \"*\", got {text:?}")),
        }
    }
}

#[cfg(feature = "serde")]
impl From<Length> for LengthRepr {
    fn from(length: Length) -> Self {
        match length {
            Length::Indefinite => Self::Text("*".to_owned()),
            Length::Count(n) => Self::Count(n),
        }
    }
}

/// How long an applied status lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duration {
    pub frequency: Frequency,
    #[cfg_attr(feature = "serde", serde(default))]
    pub length: Length,
}

impl Duration {
    pub const fn new(frequency: Frequency, length: Length) -> Self {
        Self { frequency, length }
    }

    /// Expiry time when applied at `applied_at`, `None` for indefinite.
    pub fn expires_after(&self, applied_at: GameTime) -> Option<GameTime> {
        self.length
            .span_secs(self.frequency)
            .map(|span| applied_at.saturating_add(span))
    }
}
