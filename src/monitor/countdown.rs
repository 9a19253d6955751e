use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Wall-clock countdown to the server-issued expiry instant.
///
/// The deadline comes from the login response and never moves; the client
/// clock only decides what to display. Enforcement happens server-side, so
/// a skewed local clock can mislead the display but cannot extend the exam.
#[derive(Debug, Clone, Copy)]
pub struct ExamCountdown {
    expires_at: OffsetDateTime,
}

impl ExamCountdown {
    pub fn new(expires_at: OffsetDateTime) -> Self {
        Self { expires_at }
    }

    /// Parses the `expiresAt` value from the login payload.
    pub fn from_rfc3339(value: &str) -> Result<Self, time::error::Parse> {
        Ok(Self { expires_at: OffsetDateTime::parse(value, &Rfc3339)? })
    }

    pub fn remaining(&self, now: OffsetDateTime) -> Duration {
        let left = self.expires_at - now;
        if left.is_negative() {
            Duration::ZERO
        } else {
            left
        }
    }

    pub fn is_elapsed(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    pub fn display(&self, now: OffsetDateTime) -> String {
        format_clock(self.remaining(now))
    }
}

/// Fixed reading window shown on the instructions screen before the exam
/// proper begins. Counts down from a whole number of seconds.
#[derive(Debug, Clone, Copy)]
pub struct ReadingCountdown {
    seconds_left: u64,
}

impl ReadingCountdown {
    pub fn new(total_seconds: u64) -> Self {
        Self { seconds_left: total_seconds }
    }

    /// Advances one second; returns true when the window just finished.
    pub fn tick(&mut self) -> bool {
        if self.seconds_left == 0 {
            return false;
        }
        self.seconds_left -= 1;
        self.seconds_left == 0
    }

    pub fn is_finished(&self) -> bool {
        self.seconds_left == 0
    }

    pub fn display(&self) -> String {
        format_clock(Duration::seconds(self.seconds_left as i64))
    }
}

/// Formats a non-negative duration as `MM:SS`, minutes unpadded past 99.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.whole_seconds().max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn remaining_clamps_to_zero_after_expiry() {
        let countdown = ExamCountdown::new(datetime!(2026-03-09 09:00 UTC));

        let before = datetime!(2026-03-09 08:15 UTC);
        assert_eq!(countdown.remaining(before), Duration::minutes(45));
        assert!(!countdown.is_elapsed(before));

        let after = datetime!(2026-03-09 09:05 UTC);
        assert_eq!(countdown.remaining(after), Duration::ZERO);
        assert!(countdown.is_elapsed(after));
        assert_eq!(countdown.display(after), "00:00");
    }

    #[test]
    fn parses_login_expiry_format() {
        let countdown = ExamCountdown::from_rfc3339("2026-03-09T09:00:00Z").expect("parse");
        assert!(countdown.is_elapsed(datetime!(2026-03-09 09:00 UTC)));
        assert!(ExamCountdown::from_rfc3339("not a timestamp").is_err());
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(Duration::seconds(0)), "00:00");
        assert_eq!(format_clock(Duration::seconds(59)), "00:59");
        assert_eq!(format_clock(Duration::seconds(2700)), "45:00");
        assert_eq!(format_clock(Duration::seconds(-5)), "00:00");
    }

    #[test]
    fn reading_countdown_signals_completion_once() {
        let mut reading = ReadingCountdown::new(2);
        assert_eq!(reading.display(), "00:02");
        assert!(!reading.tick());
        assert!(reading.tick());
        assert!(reading.is_finished());
        assert!(!reading.tick());
    }
}
