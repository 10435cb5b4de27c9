//! Phase timing for generation runs.

use std::time::{Duration, Instant};

/// Logs how long a phase took, either on [`Timed::finish`] or when dropped.
///
/// ```ignore
/// let _t = Timed::info("Filling gaps");
/// world.expand_regions(None, None, &mut rng);
/// // "Filling gaps took 1.234s"
/// ```
pub struct Timed {
    phase: &'static str,
    start: Instant,
    level: log::Level,
    reported: bool,
}

impl Timed {
    pub fn info(phase: &'static str) -> Self {
        Self::at_level(phase, log::Level::Info)
    }

    /// For phases inside the library that only matter when profiling.
    pub fn debug(phase: &'static str) -> Self {
        Self::at_level(phase, log::Level::Debug)
    }

    fn at_level(phase: &'static str, level: log::Level) -> Self {
        log::trace!("{} started", phase);
        Self {
            phase,
            start: Instant::now(),
            level,
            reported: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer now and return the elapsed time.
    pub fn finish(mut self) -> Duration {
        self.report()
    }

    fn report(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.reported {
            self.reported = true;
            log::log!(self.level, "{} took {:.3?}", self.phase, elapsed);
        }
        elapsed
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        self.report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reports_once() {
        let mut timer = Timed::debug("test");
        std::thread::sleep(Duration::from_millis(2));

        let first = timer.report();
        assert!(first >= Duration::from_millis(2));
        assert!(timer.reported);
        assert!(timer.finish() >= first);
    }
}
