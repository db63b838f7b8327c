use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch: Thursday, January 1, 2026 00:00:00 UTC.
///
/// The 41-bit timestamp field gives roughly 69 years of headroom from this
/// instant. Once IDs have been issued against an epoch it must never change,
/// or ordering across old and new IDs breaks.
pub const DEFAULT_EPOCH_MS: u64 = year_epoch_millis(2026);

/// Milliseconds from the Unix epoch to January 1, 00:00:00 UTC of the given
/// calendar year.
///
/// ```
/// use snowdrift::year_epoch_millis;
///
/// assert_eq!(year_epoch_millis(1970), 0);
/// assert_eq!(year_epoch_millis(2025), 1_735_689_600_000);
/// ```
pub const fn year_epoch_millis(year: u32) -> u64 {
    assert!(year >= 1970, "epoch year precedes the Unix epoch");
    let mut days: u64 = 0;
    let mut y = 1970;
    while y < year {
        days += if is_leap_year(y) { 366 } else { 365 };
        y += 1;
    }
    days * 86_400_000
}

const fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A source of wall-clock timestamps, in milliseconds since the Unix epoch.
///
/// This abstraction lets the allocator run against the real system clock or a
/// mocked one in tests. Implementations are expected to be always available
/// and non-failing; backward steps (e.g. an NTP correction) are legal and are
/// handled by the allocator's drift-recovery logic, not by the clock.
///
/// # Example
///
/// ```
/// use snowdrift::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

/// The operating system's wall clock.
///
/// Deliberately *not* a monotonic timer: the allocator's drift handling is
/// the component that deals with backward adjustments, so the clock must
/// report them rather than paper over them.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before the Unix epoch")
            .as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_year_epochs() {
        // 2025-01-01 matches the widely used custom epoch constant; 2026 is
        // exactly one non-leap year later.
        assert_eq!(year_epoch_millis(2025), 1_735_689_600_000);
        assert_eq!(DEFAULT_EPOCH_MS, 1_735_689_600_000 + 365 * 86_400_000);
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2026));
    }

    #[test]
    fn system_clock_is_past_default_epoch() {
        assert!(SystemClock.current_millis() > DEFAULT_EPOCH_MS);
    }
}
