/*!
 * Quantum Selection
 * Dynamic time quantum computed from the burst times in the ready queue
 */

use crate::core::errors::SimulationError;
use crate::core::limits::MIN_QUANTUM_TICKS;
use crate::core::types::{SimResult, SimTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Quantum computation method, fixed for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantumMethod {
    /// Mean of the burst times
    #[default]
    Arithmetic,
    /// Square root of the sum of the burst times
    ///
    /// Not a geometric mean. Kept under this name because that is the
    /// behavior users of the simulator know it by.
    Geometric,
    /// Reciprocal of the mean of the reciprocal burst times
    Harmonic,
}

impl QuantumMethod {
    pub const ALL: [QuantumMethod; 3] = [
        QuantumMethod::Arithmetic,
        QuantumMethod::Geometric,
        QuantumMethod::Harmonic,
    ];

    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Arithmetic => "arithmetic",
            Self::Geometric => "geometric",
            Self::Harmonic => "harmonic",
        }
    }

    /// Compute the quantum for the given ready-queue burst times
    ///
    /// The result is rounded to the clock granularity and is never shorter
    /// than one tick. Fails on an empty ready queue.
    pub fn quantum<I>(&self, burst_times: I) -> SimResult<SimTime>
    where
        I: IntoIterator<Item = SimTime>,
    {
        let bursts: Vec<f64> = burst_times.into_iter().map(SimTime::as_units).collect();
        if bursts.is_empty() {
            return Err(SimulationError::EmptyReadyQueue);
        }

        let n = bursts.len() as f64;
        let units = match self {
            Self::Arithmetic => bursts.iter().sum::<f64>() / n,
            Self::Geometric => bursts.iter().sum::<f64>().sqrt(),
            Self::Harmonic => n / bursts.iter().map(|b| 1.0 / b).sum::<f64>(),
        };

        let quantum = SimTime::from_units_f64(units);
        Ok(quantum.max(SimTime::from_ticks(MIN_QUANTUM_TICKS)))
    }
}

impl fmt::Display for QuantumMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantumMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arithmetic" | "am" => Ok(Self::Arithmetic),
            "geometric" | "gm" => Ok(Self::Geometric),
            "harmonic" | "hm" => Ok(Self::Harmonic),
            _ => Err(format!(
                "Invalid quantum method '{}'. Valid: arithmetic, geometric, harmonic",
                s
            )),
        }
    }
}

impl Serialize for QuantumMethod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuantumMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
