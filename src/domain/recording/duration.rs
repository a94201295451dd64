//! Whole-second durations used for recording limits and lengths

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default cap on a single recording (30 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 30 * 60;

/// A positive number of whole seconds.
///
/// Parsed from strings such as `90s`, `5m`, `1h` or `1m30s`; displayed in
/// the same compact form so a parsed value can be written back to config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    secs: u64,
}

impl Duration {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    /// Default maximum recording length
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.secs
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.secs)
    }

    /// Render as a `mm:ss` clock
    pub fn clock(&self) -> String {
        format_clock(self.secs)
    }
}

/// Format whole seconds as a zero-padded `mm:ss` clock.
/// Minutes are not wrapped into hours.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Seconds per unit suffix; units must appear largest first
const UNITS: [(char, u64); 3] = [('h', 3600), ('m', 60), ('s', 1)];

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let input = s.trim().to_ascii_lowercase();
        let mut rest = input.as_str();
        let mut next_unit = 0;
        let mut total: u64 = 0;

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
            if digits == 0 {
                return Err(invalid());
            }
            let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
            let suffix = rest[digits..].chars().next().ok_or_else(invalid)?;

            let offset = UNITS[next_unit..]
                .iter()
                .position(|(unit, _)| *unit == suffix)
                .ok_or_else(invalid)?;
            let (_, scale) = UNITS[next_unit + offset];
            next_unit += offset + 1;

            total = value
                .checked_mul(scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(invalid)?;
            rest = &rest[digits + suffix.len_utf8()..];
        }

        if total == 0 {
            return Err(invalid());
        }
        Ok(Self::from_secs(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.secs;
        if remaining == 0 {
            return write!(f, "0s");
        }
        for (unit, scale) in UNITS {
            let count = remaining / scale;
            if count > 0 {
                write!(f, "{}{}", count, unit)?;
                remaining %= scale;
            }
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: &str) -> u64 {
        s.parse::<Duration>().unwrap().as_secs()
    }

    #[test]
    fn parses_single_units() {
        assert_eq!(secs("30s"), 30);
        assert_eq!(secs("5m"), 300);
        assert_eq!(secs("1h"), 3600);
    }

    #[test]
    fn parses_combined_units() {
        assert_eq!(secs("2m30s"), 150);
        assert_eq!(secs("1h15m"), 4500);
        assert_eq!(secs("  1M30S "), 90);
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "0s", "30", "30x", "m", "1s1m", "1m1m", "-5s", "1.5m"] {
            assert!(input.parse::<Duration>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn display_is_compact_and_parsable() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_secs(3661).to_string(), "1h1m1s");
        assert_eq!(secs(&Duration::from_secs(3661).to_string()), 3661);
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(3), "00:03");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(Duration::from_secs(61).clock(), "01:01");
    }

    #[test]
    fn default_is_thirty_minutes() {
        assert_eq!(Duration::default().as_secs(), 1800);
        assert_eq!(Duration::default().as_std(), StdDuration::from_secs(1800));
    }
}
