use std::fmt::{self, Display};
use std::time::Duration;

/// Identifies one scheduled clear. Every message we show gets a fresh ID, so a
/// timer that fires after its message was replaced can be recognized and
/// ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl TimerId {
    /// The ID after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// How long each kind of message stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Inline validation messages under a field
    pub field_error: Duration,

    /// General error messages in the alert area
    pub alert_error: Duration,

    /// The success message, after which we go to the login page
    pub success_redirect: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            field_error: Duration::from_millis(3000),
            alert_error: Duration::from_millis(5000),
            success_redirect: Duration::from_millis(2000),
        }
    }
}

/// Milliseconds in a duration, saturating at `u32::MAX` (browser timers take
/// a `u32`.)
pub fn as_millis_u32(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_timings() {
        let timings = Timings::default();

        assert_eq!(as_millis_u32(timings.field_error), 3000);
        assert_eq!(as_millis_u32(timings.alert_error), 5000);
        assert_eq!(as_millis_u32(timings.success_redirect), 2000);
    }

    #[test]
    fn millis_saturate() {
        assert_eq!(as_millis_u32(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[test]
    fn ids_are_distinct() {
        let first = TimerId(0);

        assert_ne!(first, first.next());
    }
}
