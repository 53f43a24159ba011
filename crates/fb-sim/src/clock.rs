//! Fixed-period tick scheduling.
//!
//! The simulation core never sleeps or waits. A driver owns the notion of
//! elapsed time and asks the clock which ticks are due; each due tick is run
//! to completion before the next one starts.

use fb_core::ensure_positive;

use crate::error::SimResult;

/// Tracks when the next tick is due.
#[derive(Debug, Clone, PartialEq)]
pub struct TickClock {
    period: f64,
    next_tick_time: f64,
}

impl TickClock {
    /// Create a clock whose first tick falls one period after `initial_time`.
    pub fn new(period: f64, initial_time: f64) -> SimResult<Self> {
        let period = ensure_positive(period, "tick period")?;
        Ok(Self {
            period,
            next_tick_time: initial_time + period,
        })
    }

    /// Returns `true` if `current_time >= next_tick_time`.
    pub fn should_tick(&self, current_time: f64) -> bool {
        current_time >= self.next_tick_time
    }

    /// Move to the following tick. Call after a tick has run.
    pub fn advance(&mut self) {
        self.next_tick_time += self.period;
    }

    pub fn reset(&mut self, current_time: f64) {
        self.next_tick_time = current_time + self.period;
    }

    pub fn time_until_tick(&self, current_time: f64) -> f64 {
        (self.next_tick_time - current_time).max(0.0)
    }
}
