//! Backoff delay calculation
//!
//! Pure functions: a full-jitter exponential window for retry attempts and
//! a parser for server-supplied `Retry-After` hints.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Full-jitter exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Base delay for attempt zero
    pub base: Duration,
    /// Upper bound for the window
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(750),
            cap: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Create a backoff with the given base and cap
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Upper bound of the jitter window: `min(cap, base * 2^attempt)`
    pub fn ceiling(&self, attempt: u32) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let upper = self.base.as_secs_f64() * 2f64.powi(exp);
        let capped = upper.min(self.cap.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }

    /// Random delay drawn uniformly from `[0, ceiling(attempt)]`
    pub fn delay(&self, attempt: u32) -> Duration {
        self.ceiling(attempt).mul_f64(rand::random::<f64>())
    }
}

/// Parse a `Retry-After` value into a delay.
///
/// Accepts seconds (integer or fractional) or an HTTP-date. Dates in the
/// past, negative numbers, and anything unparseable yield zero, which
/// tells the caller to fall back to exponential backoff.
pub fn parse_retry_after(value: &str) -> Duration {
    parse_retry_after_at(value, Utc::now())
}

/// [`parse_retry_after`] against an explicit clock reading
pub fn parse_retry_after_at(value: &str, now: DateTime<Utc>) -> Duration {
    let value = value.trim();
    if value.is_empty() {
        return Duration::ZERO;
    }

    if let Ok(secs) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
    }

    match DateTime::parse_from_rfc2822(value) {
        Ok(date) => (date.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
        Err(_) => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test]
    fn test_ceiling_doubles_until_cap() {
        let backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(3));
        assert_eq!(backoff.ceiling(0), Duration::from_millis(500));
        assert_eq!(backoff.ceiling(1), Duration::from_secs(1));
        assert_eq!(backoff.ceiling(2), Duration::from_secs(2));
        assert_eq!(backoff.ceiling(3), Duration::from_secs(3));
        assert_eq!(backoff.ceiling(60), Duration::from_secs(3));
        assert_eq!(backoff.ceiling(u32::MAX), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_within_window() {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        for attempt in 0..8 {
            let delay = backoff.delay(attempt);
            assert!(delay <= backoff.ceiling(attempt));
        }
    }

    #[test]
    fn test_zero_base_never_sleeps() {
        let backoff = Backoff::new(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(backoff.delay(5), Duration::ZERO);
    }

    #[test_case("0.1", Duration::from_millis(100) ; "fractional seconds")]
    #[test_case("3", Duration::from_secs(3) ; "integer seconds")]
    #[test_case(" 2 ", Duration::from_secs(2) ; "padded")]
    #[test_case("", Duration::ZERO ; "empty")]
    #[test_case("-5", Duration::ZERO ; "negative")]
    #[test_case("soon", Duration::ZERO ; "garbage")]
    #[test_case("inf", Duration::ZERO ; "infinite")]
    #[test_case("NaN", Duration::ZERO ; "not a number")]
    #[test_case("1e20", Duration::ZERO ; "too large for a duration")]
    fn test_parse_retry_after_numbers(value: &str, expected: Duration) {
        assert_eq!(parse_retry_after(value), expected);
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 30).unwrap();
        let delay = parse_retry_after_at("Wed, 21 Oct 2015 07:28:00 GMT", now);
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_retry_after_past_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 8, 0, 0).unwrap();
        let delay = parse_retry_after_at("Wed, 21 Oct 2015 07:28:00 GMT", now);
        assert_eq!(delay, Duration::ZERO);
    }
}
