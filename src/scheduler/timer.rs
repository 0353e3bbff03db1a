//! Repeating timer driven by the runtime's clock.

/// One active repeating timer.
///
/// Period and limit are captured when the timer starts; changing them
/// requires starting a new timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    id: u64,
    period_ms: u64,
    limit: Option<u64>,
    next_due_ms: i64,
}

impl IntervalTimer {
    pub(super) fn start(id: u64, period_ms: u64, limit: Option<u64>, now: i64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            id,
            period_ms,
            limit,
            next_due_ms: now.saturating_add(period_as_i64(period_ms)),
        }
    }

    /// Generation number; a restarted timer always gets a new one.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn next_due_ms(&self) -> i64 {
        self.next_due_ms
    }

    pub(super) fn is_due(&self, now: i64) -> bool {
        now >= self.next_due_ms
    }

    /// Move to the following period. If that deadline has already passed,
    /// the missed periods are coalesced into the tick about to run and the
    /// next deadline becomes one period from `now`.
    pub(super) fn advance(&mut self, now: i64) {
        let period = period_as_i64(self.period_ms);
        self.next_due_ms = self.next_due_ms.saturating_add(period);
        if self.next_due_ms <= now {
            self.next_due_ms = now.saturating_add(period);
        }
    }
}

fn period_as_i64(period_ms: u64) -> i64 {
    i64::try_from(period_ms).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_deadline_is_one_period_out() {
        let timer = IntervalTimer::start(1, 1000, None, 10_000);

        assert_eq!(timer.next_due_ms(), 11_000);
        assert!(!timer.is_due(10_999));
        assert!(timer.is_due(11_000));
    }

    #[test]
    fn test_advance_keeps_cadence() {
        let mut timer = IntervalTimer::start(1, 1000, None, 0);

        timer.advance(1_000);
        assert_eq!(timer.next_due_ms(), 2_000);

        timer.advance(2_050);
        assert_eq!(timer.next_due_ms(), 3_000);
    }

    #[test]
    fn test_advance_coalesces_missed_periods() {
        let mut timer = IntervalTimer::start(1, 1000, None, 0);

        timer.advance(4_500);

        assert_eq!(timer.next_due_ms(), 5_500);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let timer = IntervalTimer::start(1, 0, Some(2), 0);

        assert_eq!(timer.period_ms(), 1);
        assert_eq!(timer.limit(), Some(2));
    }
}
