use std::ops::Not;

/// Logic level of a digital output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// The modem's two power control outputs.
///
/// Writes are fire-and-forget: the modem offers no acknowledgment line, so
/// implementations cannot report whether the modem reacted.
pub trait ModemPowerControl: Send + 'static {
    /// Drives the on/off key line (active low: a held low level requests power toggle).
    fn set_on_off(&mut self, level: Level);

    /// Drives the power-enable rail.
    fn set_power_enable(&mut self, level: Level);
}
