/*!
 * Core Types
 * Common types used across the simulator
 */

use super::limits::TICKS_PER_UNIT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Process ID type
pub type Pid = u32;

/// Raw clock ticks (tenths of a time unit)
pub type Ticks = u64;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimulationError>;

/// A point or span on the simulation clock
///
/// Stored as whole ticks so that clock comparisons stay exact; rendered with
/// one decimal place in time units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(Ticks);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// One clock tick (0.1 time unit)
    pub const TICK: SimTime = SimTime(1);

    #[inline]
    pub const fn from_ticks(ticks: Ticks) -> Self {
        Self(ticks)
    }

    /// Whole time units; saturates at the largest representable tick
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(TICKS_PER_UNIT))
    }

    /// Whole time units, `None` when the tick count would overflow
    #[inline]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(TICKS_PER_UNIT) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Round a fractional time-unit value to the nearest tick, halves to even
    ///
    /// Negative and non-finite values clamp to zero.
    pub fn from_units_f64(units: f64) -> Self {
        if !units.is_finite() || units <= 0.0 {
            return Self::ZERO;
        }
        Self((units * TICKS_PER_UNIT as f64).round_ties_even() as Ticks)
    }

    #[inline]
    pub const fn ticks(self) -> Ticks {
        self.0
    }

    #[inline]
    pub fn as_units(self) -> f64 {
        self.0 as f64 / TICKS_PER_UNIT as f64
    }

    #[inline]
    pub const fn saturating_sub(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.0 / TICKS_PER_UNIT,
            self.0 % TICKS_PER_UNIT
        )
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    /// Saturates at zero; the clock never runs backwards
    fn sub(self, rhs: SimTime) -> SimTime {
        self.saturating_sub(rhs)
    }
}

// Serialized as time units so exports and JSON read naturally
impl Serialize for SimTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_units())
    }
}

impl<'de> Deserialize<'de> for SimTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let units = f64::deserialize(deserializer)?;
        if units < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "negative time value {}",
                units
            )));
        }
        Ok(Self::from_units_f64(units))
    }
}
