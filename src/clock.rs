//! Wall-clock source for peak-window evaluation

use std::sync::atomic::{AtomicI64, Ordering};
use tokio::time::Instant;

/// Supplies the current wall-clock time
pub trait Clock: Send + Sync {
    /// Current time in epoch seconds
    fn now_epoch(&self) -> i64;
}

/// Clock set to a fixed epoch at boot that then runs forward with the
/// monotonic timer, the way the controller board's RTC is provisioned.
#[derive(Debug, Clone)]
pub struct BootClock {
    boot_epoch: i64,
    started: Instant,
}

impl BootClock {
    pub fn new(boot_epoch: i64) -> Self {
        Self {
            boot_epoch,
            started: Instant::now(),
        }
    }
}

impl Clock for BootClock {
    fn now_epoch(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_secs()).unwrap_or(i64::MAX);
        self.boot_epoch.saturating_add(elapsed)
    }
}

/// Manually driven clock for tests and simulation
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub const fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.now_epoch(), 100);
        clock.advance(300);
        assert_eq!(clock.now_epoch(), 400);
        clock.set(7);
        assert_eq!(clock.now_epoch(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn boot_clock_runs_from_boot_epoch() {
        let clock = BootClock::new(1_607_205_300);
        assert_eq!(clock.now_epoch(), 1_607_205_300);
        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(clock.now_epoch(), 1_607_205_600);
    }
}
