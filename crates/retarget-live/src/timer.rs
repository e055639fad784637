//! Tick sources for [`crate::LiveScheduler::run`].

use std::time::{Duration, Instant};

/// Periodic tick source. One tick is in flight at a time.
pub trait TickTimer {
    /// Start ticking every `interval`.
    fn arm(&mut self, interval: Duration);
    /// Block until the next tick is due.
    fn wait(&mut self);
    /// Stop ticking. Called once per armed session.
    fn release(&mut self);
}

/// Wall-clock timer that sleeps the remainder of each interval.
#[derive(Debug, Default)]
pub struct IntervalTimer {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.last.is_some()
    }
}

impl TickTimer for IntervalTimer {
    fn arm(&mut self, interval: Duration) {
        self.interval = interval;
        self.last = Some(Instant::now());
    }

    fn wait(&mut self) {
        let Some(last) = self.last else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed < self.interval {
            std::thread::sleep(self.interval - elapsed);
        }
        self.last = Some(Instant::now());
    }

    fn release(&mut self) {
        self.last = None;
    }
}

/// Timer that never sleeps and counts its calls. Useful for tests and
/// offline replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualTimer {
    pub arms: usize,
    pub waits: usize,
    pub releases: usize,
    pub interval: Option<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.arms > self.releases
    }
}

impl TickTimer for ManualTimer {
    fn arm(&mut self, interval: Duration) {
        self.arms += 1;
        self.interval = Some(interval);
    }

    fn wait(&mut self) {
        self.waits += 1;
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}
