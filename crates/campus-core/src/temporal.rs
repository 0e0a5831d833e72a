//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], the single time type used for grant windows,
//! reset-token expiry, and record audit fields.
//!
//! Expiry in Campus is evaluated lazily: nothing sweeps expired grants,
//! every read compares the stored end date against "now". That only
//! works if every stored instant and every comparison instant live on
//! the same clock, so `Timestamp` is UTC with sub-second components
//! truncated at construction. Offsets from external input are converted,
//! never stored.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp, truncated to whole seconds.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating.
/// - [`Timestamp::parse()`] — from an RFC 3339 string; any offset is
///   converted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl From<DateTime<Utc>> for Timestamp {
    /// Deserialized input is routed through here, so wire values with
    /// sub-second precision or a non-UTC offset land truncated and in
    /// UTC like every other construction path.
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Accepts any timezone offset and converts to UTC. The result
    /// always satisfies the UTC / seconds-precision invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if the string is
    /// not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ValidationError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("epoch {secs}")))?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Add a duration, returning `None` on overflow.
    ///
    /// Grant windows are built this way: `now.checked_add(period)`.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self)
    }

    /// Add a duration, clamping to the far end of the representable
    /// range instead of overflowing.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        self.checked_add(duration)
            .unwrap_or(Self(truncate_to_seconds(DateTime::<Utc>::MAX_UTC)))
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `self`
    /// precedes `earlier`).
    pub fn secs_since(&self, earlier: Timestamp) -> i64 {
        self.epoch_secs() - earlier.epoch_secs()
    }

    /// Render as ISO 8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision.
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 45).unwrap();
        let with_nanos = dt.with_nanosecond(987_654_321).unwrap();
        let ts = Timestamp::from_utc(with_nanos);
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-03-10T09:30:45Z");
    }

    #[test]
    fn parse_accepts_z_suffix() {
        let ts = Timestamp::parse("2026-03-10T09:30:45Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-10T09:30:45Z");
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let ts = Timestamp::parse("2026-03-10T14:30:45+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-10T09:30:45Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2026-03-10").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn checked_add_builds_windows() {
        let start = Timestamp::parse("2026-03-10T09:30:45Z").unwrap();
        let end = start.checked_add(Duration::days(7)).unwrap();
        assert_eq!(end.secs_since(start), 7 * 24 * 60 * 60);
    }

    #[test]
    fn checked_add_overflow_is_none() {
        let far = Timestamp::from_utc(DateTime::<Utc>::MAX_UTC);
        assert!(far.checked_add(Duration::days(1)).is_none());
    }

    #[test]
    fn saturating_add_clamps_at_range_end() {
        let far = Timestamp::from_utc(DateTime::<Utc>::MAX_UTC);
        let clamped = far.saturating_add(Duration::days(1));
        assert!(clamped >= far);
    }

    #[test]
    fn epoch_roundtrip() {
        let ts = Timestamp::parse("2026-03-10T09:30:45Z").unwrap();
        let again = Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap();
        assert_eq!(ts, again);
    }

    #[test]
    fn ordering_follows_the_clock() {
        let earlier = Timestamp::parse("2026-03-10T09:30:45Z").unwrap();
        let later = Timestamp::parse("2026-03-10T09:30:46Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn display_matches_iso8601() {
        let ts = Timestamp::parse("2026-12-31T23:59:59Z").unwrap();
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2026-03-10T09:30:45Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn deserialize_truncates_subseconds() {
        let parsed: Timestamp =
            serde_json::from_str("\"2026-03-10T09:30:45.987654321Z\"").unwrap();
        assert_eq!(parsed.as_datetime().nanosecond(), 0);
        assert_eq!(parsed.to_iso8601(), "2026-03-10T09:30:45Z");
    }

    #[test]
    fn deserialize_converts_offsets_to_utc() {
        let parsed: Timestamp = serde_json::from_str("\"2026-03-10T14:30:45+05:00\"").unwrap();
        assert_eq!(parsed.to_iso8601(), "2026-03-10T09:30:45Z");
    }
}
