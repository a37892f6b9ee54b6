use ctm_core::Observer;
use log::Level;

use crate::traits::HasProgress;

/// Logs run progress every time another slice of the run completes.
///
/// Never requests an action, so it can watch any solver whose events
/// implement [`HasProgress`].
#[derive(Debug, Clone)]
pub struct LogProgress {
    every_percent: usize,
    next_percent: usize,
    level: Level,
    reports: usize,
}

impl LogProgress {
    /// Creates an observer that logs at `info` every 10%.
    #[must_use]
    pub fn new() -> Self {
        Self::every(10)
    }

    /// Creates an observer that logs at `info` every `percent` percent.
    ///
    /// `percent` is clamped to `1..=100`.
    #[must_use]
    pub fn every(percent: usize) -> Self {
        let every_percent = percent.clamp(1, 100);
        Self {
            every_percent,
            next_percent: every_percent,
            level: Level::Info,
            reports: 0,
        }
    }

    /// Sets the level progress is logged at.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Returns how many progress lines have been logged.
    #[must_use]
    pub fn reports(&self) -> usize {
        self.reports
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HasProgress, A> Observer<E, A> for LogProgress {
    fn observe(&mut self, event: &E) -> Option<A> {
        let total = event.total_steps().max(1);
        let percent = event.step() * 100 / total;

        if percent >= self.next_percent {
            log::log!(
                self.level,
                "transient progress: {percent}% (step {}/{}, t = {:.3e} s)",
                event.step(),
                total,
                event.time(),
            );
            self.reports += 1;
            self.next_percent = (percent / self.every_percent + 1) * self.every_percent;
        }

        None
    }
}

/// Allows `&mut LogProgress` to be passed to solvers that take an observer
/// by value.
impl<E: HasProgress, A> Observer<E, A> for &mut LogProgress {
    fn observe(&mut self, event: &E) -> Option<A> {
        (*self).observe(event)
    }
}
