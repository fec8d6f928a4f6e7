//! # Relaunch: the process entry point's side of a [`Halt`].
//!
//! A watchdog expiry must end in a full restart with no surviving state. On a device
//! that is a system reset; on a host it is tearing the supervisor down and building
//! a fresh one. [`SystemRestart`] abstracts the restart itself, and [`run_forever`]
//! is the loop an entry point runs:
//!
//! ```text
//! loop {
//!   build() ──► Supervisor::run() ──► Halt
//!     ├─ WatchdogExpired   ─► restart.restart(), loop
//!     └─ anything else     ─► return Halt to the caller
//! }
//! ```

use tracing::{error, info, warn};

use super::supervisor::Supervisor;
use crate::{error::Halt, heartbeat::Indicator, modem::ModemPowerControl};

/// Restarts the system after a watchdog expiry.
///
/// Device implementations reset the MCU and never return. Hosted implementations
/// return, and [`run_forever`] then builds a brand-new supervisor.
pub trait SystemRestart {
    fn restart(&mut self);
}

/// In-process restart for hosted runs: counts boots and logs each relaunch.
#[derive(Debug, Default)]
pub struct Relauncher {
    relaunches: u64,
}

impl Relauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the supervisor was relaunched.
    pub fn relaunches(&self) -> u64 {
        self.relaunches
    }
}

impl SystemRestart for Relauncher {
    fn restart(&mut self) {
        self.relaunches += 1;
        info!(
            relaunches = self.relaunches,
            "relaunching supervisor from a clean state"
        );
    }
}

/// Boots supervisors from `build` until one halts for a reason other than the watchdog.
pub async fn run_forever<F, M, I, R>(mut build: F, restart: &mut R) -> Halt
where
    F: FnMut() -> Supervisor<M, I>,
    M: ModemPowerControl,
    I: Indicator,
    R: SystemRestart + ?Sized,
{
    loop {
        let halt = build().run().await;
        if !halt.should_relaunch() {
            match halt {
                Halt::ShutdownRequested => info!("supervisor stopped on request"),
                ref fatal => error!(label = fatal.as_label(), "halting: {fatal}"),
            }
            return halt;
        }
        warn!(label = halt.as_label(), "{halt}");
        restart.restart();
    }
}
