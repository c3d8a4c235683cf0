/*!
 * Step Clocks
 * Injectable pacing for the simulation loop
 */

use std::future::Future;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Source of simulation ticks
pub trait Clock: Send + 'static {
    /// Resolve when the next step is due
    fn next_tick(&mut self) -> impl Future<Output = ()> + Send;

    /// Change the pacing; clocks without a period ignore this
    fn set_period(&mut self, _period: Duration) {}
}

/// Wall-clock pacing backed by a tokio interval
///
/// Must be created inside a tokio runtime. Missed ticks are skipped rather
/// than bursted, so a slow observer never causes a catch-up storm.
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: Self::build(period),
        }
    }

    fn build(period: Duration) -> Interval {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Clock for IntervalClock {
    fn next_tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            self.interval.tick().await;
        }
    }

    fn set_period(&mut self, period: Duration) {
        self.interval = Self::build(period);
    }
}

/// Headless pacing: every tick is due immediately
///
/// Yields to the runtime between ticks so pending commands are still served.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualClock;

impl Clock for ManualClock {
    fn next_tick(&mut self) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}
