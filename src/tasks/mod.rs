//! # Network task abstractions.
//!
//! This module provides the collaborator-facing types:
//! - [`NetworkTask`] - trait for one attempt of the external network exchange
//! - [`TaskFactory`] - trait that constructs a fresh task per cycle
//! - [`FactoryFn`] - closure-backed factory
//! - [`Destination`] - the fixed server a task is bound to
//! - [`TaskOutcome`] - success/failure derived from the task's outcome code

mod destination;
mod factory_fn;
mod outcome;
mod task;

pub use destination::Destination;
pub use factory_fn::FactoryFn;
pub use outcome::TaskOutcome;
pub use task::{BoxNetworkTask, NetworkTask, TaskFactory};
