//! Clock injection (Design Notes §9, made concrete): the core never reads
//! the system clock directly. `Session::append` takes a `timestamp: &str`
//! parameter; this module supplies the two capability implementations
//! callers plug in — a real one and a deterministic one for tests.

use chrono::{SecondsFormat, Utc};

/// Supplies an RFC 3339 UTC timestamp at millisecond precision with a
/// trailing `Z`, e.g. `"2024-01-01T00:00:00.000Z"`.
pub trait Clock {
    fn now_rfc3339_millis(&self) -> String;
}

/// Reads the host's wall clock. Used by the CLI and adapters; `attested-core`
/// itself never constructs one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339_millis(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Always returns the same timestamp. For deterministic tests, mirroring
/// spec.md §8's fixed `ts = 2024-01-01T00:00:00.000Z` convention.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }
}

impl Clock for FixedClock {
    fn now_rfc3339_millis(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_ends_in_z_with_millis() {
        let ts = SystemClock.now_rfc3339_millis();
        assert!(ts.ends_with('Z'));
        // "YYYY-MM-DDTHH:MM:SS.mmmZ" has a '.' three digits before the trailing Z.
        let without_z = &ts[..ts.len() - 1];
        let millis = &without_z[without_z.len() - 3..];
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn fixed_clock_is_stable() {
        let c = FixedClock::new("2024-01-01T00:00:00.000Z");
        assert_eq!(c.now_rfc3339_millis(), c.now_rfc3339_millis());
    }
}
