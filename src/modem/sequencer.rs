//! # Modem power sequencer.
//!
//! Drives the modem through its graceful shutdown and then cuts the rail:
//!
//! ```text
//!            pulse hold          settle hold
//! on/off  ‾‾‾‾\______________/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! enable  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\________
//!         Enabled │ PulsingOff                │ Disabled
//! ```
//!
//! The sequence is open-loop. The modem has no acknowledgment line, so both holds
//! are fixed waits sized to its documented shutdown window. There is no retry.

use std::time::Duration;

use tokio::time;

use super::lines::{Level, ModemPowerControl};

/// Hold durations for [`PowerSequencer::power_off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Holds {
    /// How long the on/off key is held low (graceful shutdown request).
    pub pulse: Duration,
    /// Wait between releasing the key and cutting the rail.
    pub settle: Duration,
}

impl Default for Holds {
    /// `pulse = 3.5s`, `settle = 1s`.
    fn default() -> Self {
        Self {
            pulse: Duration::from_millis(3500),
            settle: Duration::from_millis(1000),
        }
    }
}

impl Holds {
    /// Total time one power-off blocks its caller.
    pub fn total(&self) -> Duration {
        self.pulse.saturating_add(self.settle)
    }
}

/// Modem power state as last driven by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// Rail up; the network stack brings the modem online on demand.
    Enabled,
    /// Rail cut.
    Disabled,
    /// On/off key held low; graceful shutdown in progress.
    PulsingOff,
}

/// Owns the modem control lines and sequences them.
pub struct PowerSequencer<M> {
    lines: M,
    holds: Holds,
    state: PowerState,
}

impl<M: ModemPowerControl> PowerSequencer<M> {
    /// Takes ownership of the lines. The rail is assumed up at boot and the lines
    /// are not touched until the first power-off.
    pub fn new(lines: M, holds: Holds) -> Self {
        Self {
            lines,
            holds,
            state: PowerState::Enabled,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Requests a graceful modem shutdown, then cuts the rail.
    ///
    /// Blocks the caller for [`Holds::total`]. Running it again on a modem that is
    /// already off repeats the pulse and ends in the same levels: key high, rail low.
    pub async fn power_off(&mut self) {
        self.state = PowerState::PulsingOff;
        self.lines.set_on_off(Level::Low);
        time::sleep(self.holds.pulse).await;
        self.lines.set_on_off(Level::High);

        time::sleep(self.holds.settle).await;
        self.lines.set_power_enable(Level::Low);
        self.state = PowerState::Disabled;
    }
}
