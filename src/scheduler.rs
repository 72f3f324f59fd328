//! Interval scheduler.
//!
//! Decides whether a cycle is due by comparing the monotonic clock with
//! the time of the last attempt.
//!
//! ```text
//!   now_ms ──▶ ┌──────────────────────────┐ ──▶ due? (and stamp last_attempt)
//!              │    IntervalScheduler     │
//!              │  last_attempt · interval │
//!              └──────────────────────────┘
//! ```
//!
//! The timestamp is written **before** the cycle runs, whatever the
//! cycle's outcome. A skipped or failed cycle is therefore not retried
//! early: the next attempt is one full interval later, which bounds the
//! request rate under persistent failure. Intervals are measured from
//! the last attempt rather than a fixed origin, so jitter from the main
//! loop's poll period shifts later cycles but never compounds into a
//! burst.

use log::debug;

/// Fixed-interval gate for the publish cycle.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval_ms: u64,
    /// Time of the last attempted cycle. Starts at 0 (boot), so the first
    /// cycle is due one interval after boot.
    last_attempt_ms: u64,
}

impl IntervalScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_attempt_ms: 0,
        }
    }

    /// Whether a cycle is due at `now_ms`, without recording anything.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.interval_ms
    }

    /// If a cycle is due, record `now_ms` as the new last attempt and
    /// return `true`. The caller must then run exactly one cycle.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        debug!(
            "Scheduler: cycle due at {} ms ({} ms since last attempt)",
            now_ms,
            self.elapsed_ms(now_ms)
        );
        self.last_attempt_ms = now_ms;
        true
    }

    /// Time since the last attempt. A clock reading behind the recorded
    /// timestamp counts as zero.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_attempt_ms)
    }

    /// Milliseconds until the next cycle is due (0 if already due).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.interval_ms.saturating_sub(self.elapsed_ms(now_ms))
    }

    pub fn last_attempt_ms(&self) -> u64 {
        self.last_attempt_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_due_before_interval() {
        let mut sched = IntervalScheduler::new(10_000);
        for t in [0, 1, 5_000, 9_999] {
            assert!(!sched.poll(t), "fired early at {t}");
        }
        assert_eq!(sched.last_attempt_ms(), 0);
    }

    #[test]
    fn fires_at_interval_and_stamps_now() {
        let mut sched = IntervalScheduler::new(10_000);
        assert!(sched.poll(10_000));
        assert_eq!(sched.last_attempt_ms(), 10_000);

        // Same instant again: not due.
        assert!(!sched.poll(10_000));
    }

    #[test]
    fn late_poll_fires_once_and_measures_from_actual_time() {
        let mut sched = IntervalScheduler::new(10_000);

        // Poll 3.5 intervals late: one cycle, not three.
        assert!(sched.poll(35_000));
        assert!(!sched.poll(35_001));
        assert!(!sched.poll(44_999));
        assert!(sched.poll(45_000));
    }

    #[test]
    fn clock_behind_last_attempt_is_not_due() {
        let mut sched = IntervalScheduler::new(1_000);
        assert!(sched.poll(5_000));
        assert!(!sched.poll(4_000));
        assert_eq!(sched.elapsed_ms(4_000), 0);
    }

    #[test]
    fn remaining_counts_down() {
        let mut sched = IntervalScheduler::new(10_000);
        assert_eq!(sched.remaining_ms(2_500), 7_500);
        assert!(sched.poll(10_000));
        assert_eq!(sched.remaining_ms(10_000), 10_000);
        assert_eq!(sched.remaining_ms(25_000), 0);
    }
}
