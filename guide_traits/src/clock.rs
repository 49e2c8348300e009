use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for guide-cycle timestamps.
///
/// Predictors only need a monotonic "now" and whole elapsed milliseconds;
/// both come from here so replays and tests can run on simulated time.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock monotonic time backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulated clock: `now() = origin + offset`, where the offset only moves
/// when advanced.
///
/// Clones share the offset, so a caller can keep a handle and advance time
/// for a predictor that owns another clone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Advance by one exposure worth of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute offset from the origin.
    pub fn set_offset(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = d;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clk = ManualClock::new();
        let epoch = clk.now();
        assert_eq!(clk.ms_since(epoch), 0);
        clk.advance_ms(1500);
        assert_eq!(clk.ms_since(epoch), 1500);
        clk.advance(Duration::from_micros(250_900));
        // whole milliseconds only
        assert_eq!(clk.ms_since(epoch), 1750);
        assert_eq!(clk.elapsed(), Duration::from_micros(1_750_900));
    }

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let epoch = b.now();
        a.advance_ms(42);
        assert_eq!(b.ms_since(epoch), 42);
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clk = ManualClock::new();
        clk.set_offset(Duration::from_millis(10));
        let later = clk.now() + Duration::from_secs(1);
        assert_eq!(clk.ms_since(later), 0);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clk = MonotonicClock::new();
        let epoch = clk.now();
        assert!(clk.now() >= epoch);
    }
}
