use crate::config::LiveConfig;
use serde::Serialize;

/// Scheduler lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SchedulerState {
    #[default]
    Idle,
    Running,
    /// Releasing resources; always followed by `Idle` within the same call.
    Cancelling,
}

/// Per-session counters, created on start and dropped on stop.
///
/// A session exists only while it is active; the scheduler holds it as an
/// `Option` and takes it on shutdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LiveSessionState {
    pub applied_once: bool,
    /// Ticks seen since start; the first tick is 1.
    pub frame_counter: u64,
    pub refresh_interval: u32,
    pub min_confidence: f32,
}

impl LiveSessionState {
    pub fn new(config: &LiveConfig) -> Self {
        Self {
            applied_once: false,
            frame_counter: 0,
            refresh_interval: config.refresh_interval,
            min_confidence: config.min_tracking_confidence,
        }
    }

    /// Count a tick and return its number.
    pub fn advance(&mut self) -> u64 {
        self.frame_counter += 1;
        self.frame_counter
    }

    /// Whether the current tick should run retargeting; marks the first
    /// application.
    pub fn take_apply(&mut self) -> bool {
        if !self.applied_once {
            self.applied_once = true;
            return true;
        }
        self.refresh_interval > 0 && self.frame_counter % u64::from(self.refresh_interval) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(refresh_interval: u32, ticks: u64) -> Vec<u64> {
        let cfg = LiveConfig {
            refresh_interval,
            ..LiveConfig::default()
        };
        let mut s = LiveSessionState::new(&cfg);
        (0..ticks)
            .filter_map(|_| {
                let frame = s.advance();
                s.take_apply().then_some(frame)
            })
            .collect()
    }

    #[test]
    fn refresh_every_three() {
        assert_eq!(fired(3, 7), [1, 3, 6]);
    }

    #[test]
    fn zero_interval_applies_once() {
        assert_eq!(fired(0, 50), [1]);
    }

    #[test]
    fn interval_one_applies_every_tick() {
        assert_eq!(fired(1, 4), [1, 2, 3, 4]);
    }
}
