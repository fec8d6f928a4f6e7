//! # Run a single network attempt.
//!
//! The task runner owns one task object for the span of one cycle:
//!
//! - **Construct** the task through the [`TaskFactory`] (failure is fatal to the supervisor)
//! - **Execute ONE attempt** by awaiting [`NetworkTask::run`] to completion
//! - **Publish** exactly one terminal event (`TaskSucceeded` / `TaskFailed`)
//! - **Tear down** the task object before returning, whatever the outcome
//!
//! ## Event flow
//!
//! ```text
//! Construction failure:
//!   factory.create() → Err(e) → publish TaskConstructionFailed → return Err(e)
//!
//! Success:
//!   task.run() → 0 → drop(task) → publish TaskSucceeded
//!
//! Failure:
//!   task.run() → code ≠ 0 → drop(task) → publish TaskFailed { code }
//! ```
//!
//! There is no timeout here: the watchdog is armed by the cycle around `run_once`,
//! and it does not cancel the attempt but discards the whole supervisor.

use crate::{
    error::ConstructError,
    events::{Bus, Event, EventKind},
    tasks::{BoxNetworkTask, Destination, TaskFactory, TaskOutcome},
};

/// Builds the task for `cycle`, publishing `TaskConstructionFailed` on error.
pub fn construct(
    factory: &dyn TaskFactory,
    dest: &Destination,
    cycle: u64,
    bus: &Bus,
) -> Result<BoxNetworkTask, ConstructError> {
    factory.create(dest).map_err(|e| {
        bus.publish(
            Event::new(EventKind::TaskConstructionFailed)
                .with_cycle(cycle)
                .with_reason(e.to_string()),
        );
        e
    })
}

/// Runs `task` to completion, drops it, and publishes the terminal event.
pub async fn run_once(mut task: BoxNetworkTask, cycle: u64, bus: &Bus) -> TaskOutcome {
    let code = task.run().await;
    drop(task);

    let outcome = TaskOutcome::from_code(code);
    let kind = if outcome.is_success() {
        EventKind::TaskSucceeded
    } else {
        EventKind::TaskFailed
    };
    bus.publish(Event::new(kind).with_cycle(cycle).with_code(code));
    outcome
}
