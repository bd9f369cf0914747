//! Health status - the single value every rollup reduces to.

use core::fmt;
use core::str::FromStr;

/// Health status of a monitor, channel, station or station group.
///
/// Variants are declared worst first, so the derived ordering makes
/// `Bad < Marginal < Good`. Taking the maximum of a set of statuses yields the
/// best one and taking the minimum yields the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Status {
    Bad,
    Marginal,
    Good,
}

impl Status {
    /// Every status, worst first.
    pub const ALL: [Status; 3] = [Status::Bad, Status::Marginal, Status::Good];

    /// The better of two statuses.
    pub fn best(self, other: Status) -> Status {
        self.max(other)
    }

    /// The worse of two statuses.
    pub fn worst(self, other: Status) -> Status {
        self.min(other)
    }

    pub fn is_good(&self) -> bool {
        matches!(self, Status::Good)
    }

    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "GOOD",
            Status::Marginal => "MARGINAL",
            Status::Bad => "BAD",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a status name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOOD" => Ok(Status::Good),
            "MARGINAL" => Ok(Status::Marginal),
            "BAD" => Ok(Status::Bad),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
