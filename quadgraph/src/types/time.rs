//! Timestamp precision handling.
//!
//! Backends may store timestamps at a coarser granularity than nanoseconds.
//! `TimePrecision` declares that granularity and `normalize_time` applies it,
//! either truncating or rounding the dropped digits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Granularity at which a backend keeps timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimePrecision {
    /// Timestamps are preserved exactly.
    #[default]
    Nanos,
    Micros,
    Millis,
}

impl TimePrecision {
    /// Number of nanoseconds in one unit of this precision.
    #[must_use]
    pub const fn step_nanos(self) -> u32 {
        match self {
            Self::Nanos => 1,
            Self::Micros => 1_000,
            Self::Millis => 1_000_000,
        }
    }
}

/// Reduce a timestamp to the given precision.
///
/// With `round` set, the sub-step remainder is rounded half up by looking at
/// the first dropped decimal digit; otherwise it is truncated. A round-up that
/// reaches a full second carries into the seconds.
#[must_use]
pub fn normalize_time(t: DateTime<Utc>, precision: TimePrecision, round: bool) -> DateTime<Utc> {
    let step = precision.step_nanos();
    if step == 1 {
        return t;
    }
    let mut secs = t.timestamp();
    let nanos = t.timestamp_subsec_nanos();
    let mut units = nanos / step;
    if round && (nanos / (step / 10)) % 10 >= 5 {
        units += 1;
    }
    let mut trimmed = units * step;
    if trimmed >= NANOS_PER_SECOND {
        secs += 1;
        trimmed -= NANOS_PER_SECOND;
    }
    DateTime::from_timestamp(secs, trimmed).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, nanos).unwrap()
    }

    #[test]
    fn test_nanos_is_identity() {
        let t = at(100, 123_456_789);
        assert_eq!(normalize_time(t, TimePrecision::Nanos, true), t);
    }

    #[test]
    fn test_truncate_to_millis_and_micros() {
        let t = at(100, 123_456_789);
        assert_eq!(
            normalize_time(t, TimePrecision::Millis, false),
            at(100, 123_000_000)
        );
        assert_eq!(
            normalize_time(t, TimePrecision::Micros, false),
            at(100, 123_456_000)
        );
    }

    #[test]
    fn test_round_looks_at_first_dropped_digit() {
        let t = at(100, 123_456_789);
        assert_eq!(
            normalize_time(t, TimePrecision::Millis, true),
            at(100, 123_000_000)
        );
        assert_eq!(
            normalize_time(t, TimePrecision::Micros, true),
            at(100, 123_457_000)
        );
    }

    #[test]
    fn test_round_carries_into_seconds() {
        let t = at(100, 999_600_000);
        assert_eq!(normalize_time(t, TimePrecision::Millis, true), at(101, 0));
        assert_eq!(
            normalize_time(t, TimePrecision::Millis, false),
            at(100, 999_000_000)
        );
        let t = at(100, 999_999_600);
        assert_eq!(normalize_time(t, TimePrecision::Micros, true), at(101, 0));
    }
}
