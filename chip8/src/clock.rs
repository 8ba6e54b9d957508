//! CPU Clock.
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::constants::*;

/// Timer to synchronize thread with the software clock of the virtual CPU.
///
/// It is designed to work with the yielding cooperative pattern
/// of the interpreter loop. When the VM yields control back to the
/// caller, time elapses until it is resumed. Once the interpreter
/// is resumed, the elapsed time is taken into account when determining
/// the next cycle.
pub struct Clock {
    start: Instant,
    interval: Duration,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
        }
    }

    pub fn from_nanos(nanos: u64) -> Self {
        Self::new(Duration::from_nanos(nanos))
    }

    /// Clock ticking at the 60 Hz timer rate.
    pub fn timer() -> Self {
        Self::from_nanos(TIMER_CYCLE_TIME)
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.start = Instant::now()
    }

    /// Check without blocking whether a full interval has elapsed.
    ///
    /// When it has, the clock advances by one interval. Falling more than
    /// one interval behind drops the backlog instead of catching up.
    pub fn tick(&mut self) -> bool {
        let elapsed = self.start.elapsed();
        if elapsed < self.interval {
            return false;
        }

        if elapsed >= self.interval * 2 {
            self.reset();
        } else {
            self.start += self.interval;
        }

        true
    }

    /// Block the current thread until the next clock cycle.
    pub fn wait(&mut self) {
        loop {
            let elapsed = self.start.elapsed();
            if elapsed < self.interval {
                // Sleep does not have enough resolution for short intervals.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Sleep through the bulk of long waits, and yield for the rest.
                let remaining = self.interval - elapsed;
                if remaining > Duration::from_millis(2) {
                    thread::sleep(remaining - Duration::from_millis(1));
                } else {
                    thread::yield_now();
                }
            } else {
                // Reset back to zero, rather than trying to catch up.
                //
                // If the VM was paused for debugging, and a large
                // amount of time has elapsed until it is resumed,
                // it should simply continue at the next cycle running
                // at its usual speed.
                self.reset();
                return;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_interval_always_ticks() {
        let mut clock = Clock::new(Duration::ZERO);
        assert!(clock.tick());
        assert!(clock.tick());
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut clock = Clock::new(Duration::from_secs(3600));
        assert!(!clock.tick());
    }

    #[test]
    fn test_wait() {
        let mut clock = Clock::new(Duration::from_millis(5));
        let start = Instant::now();
        clock.wait();
        assert!(start.elapsed() >= Duration::from_millis(4));
    }
}
