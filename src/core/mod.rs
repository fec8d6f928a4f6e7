//! Runtime core: the supervised cycle and its plumbing.
//!
//! The public API from this module is [`Supervisor`] (one boot), [`run_forever`]
//! (the relaunch loop), [`Config`], and the standalone [`Deadline`] / [`Scheduler`]
//! building blocks.
//!
//! Internal modules:
//! - [`scheduler`]: single-worker cooperative job queue;
//! - [`deadline`]: one-shot watchdog that signals a restart on expiry;
//! - [`runner`]: constructs and runs one network attempt, publishing its outcome;
//! - [`cycle`]: the arm/run/disarm/power-down/requeue state machine;
//! - [`supervisor`]: wires cycle, heartbeat, watchdog and subscribers for one boot;
//! - [`relaunch`]: restart abstraction and the entry point loop;
//! - [`shutdown`]: host termination signals.

mod builder;
mod config;
mod cycle;
mod deadline;
mod relaunch;
mod runner;
mod scheduler;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use deadline::Deadline;
pub use relaunch::{run_forever, Relauncher, SystemRestart};
pub use scheduler::{Job, Scheduler, SchedulerHandle};
pub use supervisor::Supervisor;
