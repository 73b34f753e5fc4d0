//! Point-in-time selection for projections.

use crate::{Error, HybridTimestamp};
use chrono::DateTime;
use std::fmt;
use std::str::FromStr;

/// Which state of the log a projection should reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeSelector {
    /// The current state, served from the cached projection.
    #[default]
    Latest,
    /// The state after every event stamped at or before the given instant.
    At(HybridTimestamp),
}

impl TimeSelector {
    /// True if an event stamped `timestamp` is visible under this selector.
    #[must_use]
    pub fn includes(&self, timestamp: &HybridTimestamp) -> bool {
        match self {
            Self::Latest => true,
            Self::At(at) => timestamp <= at,
        }
    }
}

impl From<HybridTimestamp> for TimeSelector {
    fn from(at: HybridTimestamp) -> Self {
        Self::At(at)
    }
}

impl From<Option<HybridTimestamp>> for TimeSelector {
    fn from(at: Option<HybridTimestamp>) -> Self {
        at.map_or(Self::Latest, Self::At)
    }
}

impl fmt::Display for TimeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::At(at) => write!(f, "{at}"),
        }
    }
}

/// Parses `latest`, `<millis>:<logical>`, `<millis>` or an RFC 3339 instant.
///
/// Millisecond-precision forms select the end of that millisecond, so every
/// event stamped within it is included.
impl FromStr for TimeSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }

        let invalid = || Error::InvalidTimeSelector(s.to_string());

        if let Some((wall, logical)) = trimmed.split_once(':') {
            if is_digits(wall) {
                let wall = wall.parse::<u64>().map_err(|_| invalid())?;
                let logical = logical.parse::<u32>().map_err(|_| invalid())?;
                return Ok(Self::At(HybridTimestamp::new(wall, logical)));
            }
        }

        if is_digits(trimmed) {
            let wall = trimmed.parse::<u64>().map_err(|_| invalid())?;
            return Ok(Self::At(HybridTimestamp::end_of_millisecond(wall)));
        }

        let instant = DateTime::parse_from_rfc3339(trimmed).map_err(|_| invalid())?;
        let wall = u64::try_from(instant.timestamp_millis()).map_err(|_| invalid())?;
        Ok(Self::At(HybridTimestamp::end_of_millisecond(wall)))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
