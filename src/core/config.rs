//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor.
//!
//! The values are build-time constants of the device: [`Config::default`] encodes
//! them, and nothing is parsed at runtime. Tests and hosted demos override fields
//! directly.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` / `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::modem::Holds;
use crate::tasks::Destination;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `destination`: server the network task is bound to
/// - `watchdog`: per-cycle deadline; expiry relaunches the whole supervisor
/// - `pulse_hold` / `settle_hold`: modem power-off holds
/// - `heartbeat_period`: liveness indicator toggle period
/// - `queue_capacity`: cooperative scheduler queue size
/// - `bus_capacity`: event bus ring buffer size
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server the network task talks to.
    pub destination: Destination,

    /// Deadline armed around each network attempt.
    ///
    /// Long enough to cover a worst-case TLS handshake plus HTTP exchange over a
    /// cellular link. Expiry is not retried: the supervisor halts for relaunch.
    pub watchdog: Duration,

    /// How long the modem on/off key is held low during power-off.
    pub pulse_hold: Duration,

    /// Wait between releasing the on/off key and cutting the modem rail.
    pub settle_hold: Duration,

    /// Heartbeat indicator toggle period.
    pub heartbeat_period: Duration,

    /// Capacity of the cooperative scheduler queue.
    pub queue_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the power-off holds.
    #[inline]
    pub fn holds(&self) -> Holds {
        Holds {
            pulse: self.pulse_hold,
            settle: self.settle_hold,
        }
    }

    /// Returns the time budget one network attempt has before the watchdog fires.
    #[inline]
    pub fn cycle_budget(&self) -> Duration {
        self.watchdog
    }

    /// Returns a scheduler queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `destination = os.mbed.com:443`
    /// - `watchdog = 300s`
    /// - `pulse_hold = 3.5s`, `settle_hold = 1s`
    /// - `heartbeat_period = 500ms`
    /// - `queue_capacity = 32`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        let holds = Holds::default();
        Self {
            destination: Destination::default(),
            watchdog: Duration::from_secs(300),
            pulse_hold: holds.pulse,
            settle_hold: holds.settle,
            heartbeat_period: Duration::from_millis(500),
            queue_capacity: 32,
            bus_capacity: 1024,
        }
    }
}
