use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("not a plain unsigned integer: {0:?}")]
    InvalidValue(String),
    #[error("value does not fit in 64 bits: {0:?}")]
    Overflow(String),
}

/// A position in a track, counted in microseconds from its start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(u64);

impl Micros {
    pub const ZERO: Self = Self(0);

    const PER_SECOND: u64 = 1_000_000;

    pub const fn new(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(Self::PER_SECOND))
    }

    /// Length of `frames` samples at `sample_rate` Hz, rounded down.
    pub fn from_frames(frames: u64, sample_rate: u32) -> Self {
        if sample_rate == 0 {
            return Self::ZERO;
        }
        let micros = u128::from(frames) * u128::from(Self::PER_SECOND) / u128::from(sample_rate);
        Self(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Index of the `period`-sized slot this position falls into.
    ///
    /// A zero period puts every position in its own slot.
    pub fn slot(&self, period: Micros) -> u64 {
        if period.0 == 0 {
            self.0
        } else {
            self.0 / period.0
        }
    }
}

impl From<Duration> for Micros {
    fn from(duration: Duration) -> Self {
        Self(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
    }
}

impl From<Micros> for Duration {
    fn from(micros: Micros) -> Self {
        Duration::from_micros(micros.0)
    }
}

/// Parses a bare decimal count of microseconds.
///
/// The whole string must be ASCII digits: signs, whitespace, units and
/// trailing garbage are all rejected.
impl FromStr for Micros {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::InvalidValue(s.to_owned()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| TimeError::Overflow(s.to_owned()))
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
