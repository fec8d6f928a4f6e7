//! Error types used by the cellvisor runtime and its collaborators.
//!
//! This module defines three enums:
//!
//! - [`Halt`]: terminal signals that end one [`Supervisor::run`](crate::Supervisor::run).
//! - [`ConstructError`]: raised by a [`TaskFactory`](crate::TaskFactory) when a task cannot be built.
//! - [`PostError`]: raised when the cooperative scheduler refuses a job.
//!
//! A failed network attempt is **not** an error here: it is an ordinary
//! [`TaskOutcome::Failure`](crate::TaskOutcome) that is logged and retried.
//!
//! All types provide `as_label` (stable snake_case, for logs/metrics) and `as_message`.

use std::time::Duration;
use thiserror::Error;

/// # Terminal signals of the supervisor.
///
/// A `Halt` is not recoverable inside the running supervisor. It propagates out of
/// [`Supervisor::run`](crate::Supervisor::run) to the process entry point, which decides
/// between relaunching from a clean state and stopping for good.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The per-cycle deadline expired before the cycle disarmed it.
    ///
    /// The device is presumed wedged; all in-memory state is discarded and the
    /// process must be relaunched.
    #[error("watchdog expired after {deadline:?} in cycle {cycle}; restarting")]
    WatchdogExpired {
        /// The deadline that was armed.
        deadline: Duration,
        /// The cycle that was in flight.
        cycle: u64,
    },

    /// The network task could not be constructed (resource exhaustion).
    ///
    /// The process halts deliberately instead of running degraded.
    #[error("network task construction failed: {reason}")]
    TaskConstruction {
        /// The underlying construction error message.
        reason: String,
    },

    /// The watchdog thread could not be started; the supervisor refuses to run unguarded.
    #[error("watchdog unavailable: {reason}")]
    WatchdogUnavailable {
        /// The underlying OS error message.
        reason: String,
    },

    /// The scheduler refused the next cycle; the retry chain is broken.
    #[error("scheduler rejected the next cycle: {error}")]
    SchedulerClosed {
        /// Why the job was refused.
        error: PostError,
    },

    /// A termination signal was received (hosted runs only).
    #[error("shutdown requested")]
    ShutdownRequested,
}

impl Halt {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cellvisor::Halt;
    /// use std::time::Duration;
    ///
    /// let halt = Halt::WatchdogExpired { deadline: Duration::from_secs(300), cycle: 4 };
    /// assert_eq!(halt.as_label(), "halt_watchdog_expired");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Halt::WatchdogExpired { .. } => "halt_watchdog_expired",
            Halt::TaskConstruction { .. } => "halt_task_construction",
            Halt::WatchdogUnavailable { .. } => "halt_watchdog_unavailable",
            Halt::SchedulerClosed { .. } => "halt_scheduler_closed",
            Halt::ShutdownRequested => "halt_shutdown_requested",
        }
    }

    /// Returns a human-readable message with details about the halt.
    pub fn as_message(&self) -> String {
        match self {
            Halt::WatchdogExpired { deadline, cycle } => {
                format!("watchdog: cycle={cycle} deadline={deadline:?}")
            }
            Halt::TaskConstruction { reason } => format!("construction: {reason}"),
            Halt::WatchdogUnavailable { reason } => format!("watchdog thread: {reason}"),
            Halt::SchedulerClosed { error } => format!("scheduler: {error}"),
            Halt::ShutdownRequested => "shutdown requested".to_string(),
        }
    }

    /// Indicates whether the entry point should relaunch from a clean state.
    ///
    /// Only a watchdog expiry relaunches. Construction failures halt for good,
    /// and a shutdown request is honored.
    ///
    /// # Example
    /// ```
    /// use cellvisor::Halt;
    ///
    /// let fatal = Halt::TaskConstruction { reason: "out of memory".into() };
    /// assert!(!fatal.should_relaunch());
    /// ```
    pub fn should_relaunch(&self) -> bool {
        matches!(self, Halt::WatchdogExpired { .. })
    }
}

/// # Errors produced while constructing a network task.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructError {
    /// Allocation of the task object failed.
    #[error("failed to allocate network task ({requested} bytes)")]
    OutOfMemory {
        /// Bytes the task needed.
        requested: usize,
    },

    /// A resource the task depends on could not be acquired.
    #[error("network task unavailable: {reason}")]
    Unavailable {
        /// The underlying error message.
        reason: String,
    },
}

impl ConstructError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConstructError::OutOfMemory { .. } => "construct_out_of_memory",
            ConstructError::Unavailable { .. } => "construct_unavailable",
        }
    }
}

/// # Errors produced when posting a job to the scheduler.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostError {
    /// The queue is at capacity.
    #[error("queue full")]
    Full,
    /// The worker is gone; nothing will ever drain the queue.
    #[error("queue closed")]
    Closed,
}

impl PostError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PostError::Full => "post_full",
            PostError::Closed => "post_closed",
        }
    }
}
