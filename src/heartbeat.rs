//! # Heartbeat: liveness indicator.
//!
//! Toggles an [`Indicator`] on a fixed period on its own tokio task, so the signal keeps
//! blinking while the scheduler worker sits inside a long network call or a power hold.
//! It shares nothing with the supervisor; the only input is a [`CancellationToken`].

use std::time::Duration;

use tokio::{select, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::modem::Level;

/// A visual liveness output (typically an LED).
pub trait Indicator: Send + 'static {
    fn set(&mut self, level: Level);
}

/// Periodic toggler for an [`Indicator`].
pub struct Heartbeat<I> {
    indicator: I,
    period: Duration,
    level: Level,
}

impl<I: Indicator> Heartbeat<I> {
    /// Starts low; the first toggle happens one `period` after [`run`](Self::run).
    pub fn new(indicator: I, period: Duration) -> Self {
        Self {
            indicator,
            period: period.max(Duration::from_millis(1)),
            level: Level::Low,
        }
    }

    /// Toggles until `token` is cancelled, then hands the indicator back.
    pub async fn run(mut self, token: CancellationToken) -> I {
        let mut ticker = time::interval_at(time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            select! {
                _ = ticker.tick() => {
                    self.level = !self.level;
                    self.indicator.set(self.level);
                }
                _ = token.cancelled() => break,
            }
        }
        self.indicator
    }

    /// Runs the heartbeat on its own task.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<I> {
        tokio::spawn(self.run(token))
    }
}
