//! Duration values reported by latency-style monitors (LAG, TIMELINESS, ...).
//!
//! Monitors report durations in microseconds so the value survives any
//! serialization format unchanged.

use core::fmt;
use core::time::Duration;

/// Duration in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Microseconds(pub u64);

impl Microseconds {
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000)
    }

    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Milliseconds, truncated.
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1000
    }

    pub const fn to_duration(&self) -> Duration {
        Duration::from_micros(self.0)
    }
}

impl From<Duration> for Microseconds {
    fn from(d: Duration) -> Self {
        // Saturate rather than wrap for absurdly long durations.
        Self(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }
}

impl From<Microseconds> for Duration {
    fn from(m: Microseconds) -> Self {
        m.to_duration()
    }
}

impl fmt::Display for Microseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0;
        if micros >= 1_000_000 {
            write!(f, "{:.1}s", micros as f64 / 1_000_000.0)
        } else if micros >= 1000 {
            write!(f, "{}ms", micros / 1000)
        } else {
            write!(f, "{}us", micros)
        }
    }
}
