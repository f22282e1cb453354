use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// Timestamp
///
/// Epoch-millisecond instant. The millisecond count is the authoritative
/// representation everywhere: storage encoding, comparisons, and equality.
/// The RFC 3339 rendering is a human-readable mirror only.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Current wall-clock instant.
    ///
    /// Clocks before the epoch clamp to zero.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// RFC 3339 mirror string, if the instant is representable as a
    /// calendar date. Out-of-range instants yield `None`.
    #[must_use]
    pub fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0).checked_mul(1_000_000)?;
        let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;

        dt.format(&Rfc3339).ok()
    }

    /// Parse an RFC 3339 string, truncating to millisecond precision.
    pub fn from_rfc3339(s: &str) -> Result<Self, time::error::Parse> {
        let dt = OffsetDateTime::parse(s, &Rfc3339)?;
        let millis = dt.unix_timestamp_nanos() / 1_000_000;

        Ok(Self(i64::try_from(millis).unwrap_or(i64::MAX)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(iso) => write!(f, "{iso}"),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}
