//! # cellvisor
//!
//! **Cellvisor** supervises a periodic network-connectivity task on a device with a
//! cellular modem.
//!
//! Each cycle constructs a network attempt, runs it under a watchdog deadline, cuts
//! power to the modem with a timed line sequence, and posts the next cycle. Success
//! and failure are handled the same way. A heartbeat indicator toggles on its own
//! task the whole time, and a cycle that outlives the watchdog ends the boot so the
//! entry point can relaunch from a clean state.
//!
//! ## Architecture
//! ### Overview
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (one boot)                                            │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - Scheduler (single worker, one job at a time)                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  CycleLoop   │   │   Deadline   │   │  Heartbeat   │   │
//!     │ (on worker)  │   │ (OS thread)  │   │ (own task)   │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ Publishes:       │ Publishes:       │ Drives:         │
//!      │ - CycleStarting  │ - DeadlineArmed  │ - Indicator     │
//!      │ - TaskSucceeded  │ - Disarmed       │                 │
//!      │ - TaskFailed     │ - WatchdogExp.   │                 │
//!      │ - PowerDown*     │ ──► Halt         │                 │
//!      ▼                  ▼                                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     LogWriter CycleStats  custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! run_forever(build) ──► Supervisor::run()
//!
//! cycle {
//!   ├─► publish CycleStarting{ cycle }
//!   ├─► factory.create(destination)   ── Err ─► Halt::TaskConstruction
//!   ├─► Deadline::arm(watchdog)       ── expiry ─► Halt::WatchdogExpired ─► relaunch
//!   ├─► task.run() ─► publish TaskSucceeded | TaskFailed{ code }
//!   ├─► Deadline::disarm()
//!   ├─► PowerSequencer::power_off()   (on_off low, pulse hold, on_off high, settle hold, rail off)
//!   └─► post(next cycle)              ── Err ─► Halt::SchedulerClosed
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Network task**  | One attempt of the external exchange, built fresh per cycle.  | [`NetworkTask`], [`TaskFactory`], [`FactoryFn`] |
//! | **Modem power**   | Board lines and the timed power-off sequence.                 | [`ModemPowerControl`], [`PowerSequencer`]  |
//! | **Liveness**      | Heartbeat indicator and watchdog deadline.                    | [`Indicator`], [`Heartbeat`], [`Deadline`] |
//! | **Supervision**   | One boot, and the relaunch loop around it.                    | [`Supervisor`], [`run_forever`]            |
//! | **Subscriber API**| Hook into cycle events (logging, counters, custom).           | [`Subscribe`], [`LogWriter`], [`CycleStats`] |
//! | **Errors**        | Why a boot ended, and why a task could not be built.          | [`Halt`], [`ConstructError`]               |
//! | **Configuration** | Destination, watchdog, holds, heartbeat and queue sizes.      | [`Config`]                                 |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use cellvisor::{
//!     run_forever, BoxNetworkTask, Config, Destination, FactoryFn, Indicator, Level, LogWriter,
//!     ModemPowerControl, NetworkTask, Relauncher, Subscribe, Supervisor,
//! };
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl NetworkTask for Ping {
//!     async fn run(&mut self) -> i32 { 0 }
//! }
//!
//! struct Pins;
//! impl ModemPowerControl for Pins {
//!     fn set_on_off(&mut self, _level: Level) {}
//!     fn set_power_enable(&mut self, _level: Level) {}
//! }
//!
//! struct Led;
//! impl Indicator for Led {
//!     fn set(&mut self, _level: Level) {}
//! }
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() {
//!     let factory = FactoryFn::arc("ping", |_dest: &Destination| {
//!         Ok(Box::new(Ping) as BoxNetworkTask)
//!     });
//!
//!     let halt = run_forever(
//!         || {
//!             Supervisor::builder(Config::default())
//!                 .with_subscribers(vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
//!                 .build(factory.clone(), Pins, Led)
//!         },
//!         &mut Relauncher::new(),
//!     )
//!     .await;
//!     eprintln!("{halt}");
//! }
//! ```
mod core;
mod error;
mod events;
mod heartbeat;
mod modem;
mod subscribers;
mod tasks;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use core::{
    run_forever, Config, Deadline, Job, Relauncher, Scheduler, SchedulerHandle, Supervisor,
    SupervisorBuilder, SystemRestart,
};
pub use error::{ConstructError, Halt, PostError};
pub use events::{Bus, Event, EventKind};
pub use heartbeat::{Heartbeat, Indicator};
pub use modem::{Holds, Level, ModemPowerControl, PowerSequencer, PowerState};
pub use subscribers::{CycleCounts, CycleStats, LogWriter, Subscribe, SubscriberSet};
pub use tasks::{BoxNetworkTask, Destination, FactoryFn, NetworkTask, TaskFactory, TaskOutcome};
