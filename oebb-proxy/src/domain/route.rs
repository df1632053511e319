//! Supported directions and station identifiers.

use std::fmt;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A numeric IBNR station identifier as used by the ÖBB and DB journey APIs.
///
/// # Examples
///
/// ```
/// use oebb_proxy::domain::StationId;
///
/// let linz = StationId::parse("8100013").unwrap();
/// assert_eq!(linz.as_str(), "8100013");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("81-00013").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    /// Longest id accepted; IBNRs are 7 digits, some APIs zero-pad to 9.
    const MAX_LEN: usize = 9;

    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        if s.is_empty() || s.len() > Self::MAX_LEN {
            return Err(InvalidStationId {
                reason: "must be 1-9 digits",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidStationId {
                reason: "must be ASCII digits",
            });
        }
        Ok(StationId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two served directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDirection {
    StPoeltenToLinz,
    LinzToStPoelten,
}

impl RouteDirection {
    pub const ALL: [RouteDirection; 2] = [
        RouteDirection::StPoeltenToLinz,
        RouteDirection::LinzToStPoelten,
    ];

    /// Path segment used by the HTTP boundary.
    pub fn slug(&self) -> &'static str {
        match self {
            RouteDirection::StPoeltenToLinz => "stpoelten-linz",
            RouteDirection::LinzToStPoelten => "linz-stpoelten",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Human-readable label, e.g. `St. Pölten → Linz`.
    pub fn label(&self) -> &'static str {
        match self {
            RouteDirection::StPoeltenToLinz => "St. Pölten → Linz",
            RouteDirection::LinzToStPoelten => "Linz → St. Pölten",
        }
    }

    /// Dense index for per-direction state.
    pub(crate) fn index(&self) -> usize {
        match self {
            RouteDirection::StPoeltenToLinz => 0,
            RouteDirection::LinzToStPoelten => 1,
        }
    }
}

impl fmt::Display for RouteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
