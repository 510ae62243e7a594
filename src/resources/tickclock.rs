//! Fixed-timestep accumulator.
//!
//! Real elapsed time is turned into whole logical ticks at a fixed rate. The
//! fractional remainder carries over to the next call, so the total number of
//! ticks only depends on the total elapsed time, never on how it was split
//! across calls.
//!
//! Time is accumulated in integer "tick-nanoseconds" (`elapsed_ns * rate`):
//! one tick is exactly `1_000_000_000` units, which keeps the carry exact
//! even though `1s / 60` is not a whole number of nanoseconds.
//!
//! After a long stall the clock would otherwise owe many ticks at once, and
//! running them makes the next frame late too. [`TickClock::advance`]
//! therefore hands out at most `max_catch_up` ticks per call and drops the
//! remaining whole ticks, keeping only the fraction.

use std::time::Duration;

use log::warn;

const UNITS_PER_TICK: u128 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct TickClock {
    ticks_per_second: u32,
    max_catch_up: u32,
    /// Owed time in units of `1 / (ticks_per_second * 1e9)` seconds.
    carry: u128,
    dropped: u64,
}

impl TickClock {
    /// Both arguments must be positive; zero is bumped to one.
    pub fn new(ticks_per_second: u32, max_catch_up: u32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1),
            max_catch_up: max_catch_up.max(1),
            carry: 0,
            dropped: 0,
        }
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Add `elapsed` real time and return how many ticks to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.carry += elapsed.as_nanos() * u128::from(self.ticks_per_second);
        let owed = self.carry / UNITS_PER_TICK;
        self.carry %= UNITS_PER_TICK;

        let cap = u128::from(self.max_catch_up);
        if owed > cap {
            let skipped = owed - cap;
            self.dropped = self.dropped.saturating_add(skipped as u64);
            warn!(
                "Simulation is {} ticks behind, dropping them (max {} per frame)",
                skipped, self.max_catch_up
            );
            self.max_catch_up
        } else {
            owed as u32
        }
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    pub fn delta(&self) -> f64 {
        self.carry as f64 / UNITS_PER_TICK as f64
    }

    /// Ticks thrown away by the catch-up cap since creation.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped
    }
}
