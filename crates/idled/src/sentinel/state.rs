//! Consecutive-idle counter

use super::types::IdleVerdict;

/// Counts consecutive idle checks up to the configured threshold
#[derive(Debug, Clone)]
pub struct IdleTracker {
    required: u32,
    count: u32,
}

impl IdleTracker {
    /// `required` is clamped to at least one check
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            count: 0,
        }
    }

    /// Feed the result of one check
    pub fn record(&mut self, in_use: bool) -> IdleVerdict {
        if in_use {
            self.count = 0;
            return IdleVerdict::Busy;
        }

        self.count = self.count.saturating_add(1);
        if self.count >= self.required {
            IdleVerdict::PowerDue { count: self.count }
        } else {
            IdleVerdict::Idle {
                count: self.count,
                required: self.required,
            }
        }
    }

    /// Start counting from zero (after a completed power action)
    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn required(&self) -> u32 {
        self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_on_nth_idle_check() {
        let mut tracker = IdleTracker::new(3);
        assert_eq!(tracker.record(false), IdleVerdict::Idle { count: 1, required: 3 });
        assert_eq!(tracker.record(false), IdleVerdict::Idle { count: 2, required: 3 });
        assert_eq!(tracker.record(false), IdleVerdict::PowerDue { count: 3 });
    }

    #[test]
    fn test_busy_resets() {
        let mut tracker = IdleTracker::new(2);
        tracker.record(false);
        assert_eq!(tracker.record(true), IdleVerdict::Busy);
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.record(false), IdleVerdict::Idle { count: 1, required: 2 });
    }

    #[test]
    fn test_stays_due_until_reset() {
        let mut tracker = IdleTracker::new(1);
        assert_eq!(tracker.record(false), IdleVerdict::PowerDue { count: 1 });
        assert_eq!(tracker.record(false), IdleVerdict::PowerDue { count: 2 });
        tracker.reset();
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_zero_threshold_clamped() {
        let mut tracker = IdleTracker::new(0);
        assert_eq!(tracker.required(), 1);
        assert_eq!(tracker.record(false), IdleVerdict::PowerDue { count: 1 });
    }
}
