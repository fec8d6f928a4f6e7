//! Modem power control.
//!
//! - [`ModemPowerControl`] the two output lines, implemented by the board layer
//! - [`PowerSequencer`] owns the lines and runs the timed power-off sequence
//! - [`Level`], [`PowerState`], [`Holds`] supporting types

mod lines;
mod sequencer;

pub use lines::{Level, ModemPowerControl};
pub use sequencer::{Holds, PowerSequencer, PowerState};
