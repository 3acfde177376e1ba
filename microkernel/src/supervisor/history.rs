use std::time::Duration;

/// Number of restart timestamps a supervisor remembers.
pub const MAX_RESTART_HISTORY: usize = 32;

/// Ring of the most recent restart times.
#[derive(Debug, Clone)]
pub struct RestartHistory {
    times: [Duration; MAX_RESTART_HISTORY],
    head: usize,
    count: usize,
}

impl Default for RestartHistory {
    fn default() -> Self {
        Self {
            times: [Duration::ZERO; MAX_RESTART_HISTORY],
            head: 0,
            count: 0,
        }
    }
}

impl RestartHistory {
    pub fn record(&mut self, now: Duration) {
        self.times[self.head] = now;
        self.head = (self.head + 1) % MAX_RESTART_HISTORY;
        if self.count < MAX_RESTART_HISTORY {
            self.count += 1;
        }
    }

    /// Restarts recorded no longer than `window` before `now`.
    pub fn recent(&self, now: Duration, window: Duration) -> usize {
        (0..self.count)
            .map(|i| (self.head + MAX_RESTART_HISTORY - 1 - i) % MAX_RESTART_HISTORY)
            .filter(|&idx| now.saturating_sub(self.times[idx]) <= window)
            .count()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Records a restart at `now` and reports whether it stays within
    /// `max_restarts` for the trailing `window`.
    pub fn permit(&mut self, now: Duration, max_restarts: u32, window: Duration) -> bool {
        if max_restarts == 0 {
            return false;
        }
        self.record(now);
        self.recent(now, window) <= max_restarts as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn test_limit_is_inclusive() {
        let mut history = RestartHistory::default();
        assert!(history.permit(Duration::ZERO, 2, 10 * SEC));
        assert!(history.permit(SEC, 2, 10 * SEC));
        assert!(!history.permit(2 * SEC, 2, 10 * SEC));
    }

    #[test]
    fn test_zero_max_never_permits() {
        let mut history = RestartHistory::default();
        assert!(!history.permit(Duration::ZERO, 0, 10 * SEC));
        assert!(history.is_empty());
    }

    #[test]
    fn test_old_restarts_fall_out_of_window() {
        let mut history = RestartHistory::default();
        assert!(history.permit(Duration::ZERO, 1, 5 * SEC));
        assert!(history.permit(6 * SEC, 1, 5 * SEC));
        assert!(!history.permit(7 * SEC, 1, 5 * SEC));
        assert_eq!(history.recent(20 * SEC, 5 * SEC), 0);
    }

    #[test]
    fn test_ring_wraps() {
        let mut history = RestartHistory::default();
        for i in 0..(MAX_RESTART_HISTORY as u64 + 8) {
            history.record(Duration::from_millis(i));
        }
        assert_eq!(history.len(), MAX_RESTART_HISTORY);
        assert_eq!(history.recent(Duration::from_millis(39), Duration::from_millis(3)), 4);
    }
}
