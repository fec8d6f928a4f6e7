//! # Network task and factory abstractions.
//!
//! The supervisor never speaks TLS or HTTP itself. It needs two capabilities:
//! - [`TaskFactory`]: build a fresh task bound to a [`Destination`] (may fail: fatal);
//! - [`NetworkTask`]: attempt the network exchange once and report an outcome code.
//!
//! One task object is created per cycle and dropped at cycle end, whatever the outcome.
//! Tasks never see a cancellation token: the only way to abandon a wedged task is
//! the watchdog restart, which discards the whole supervisor.

use async_trait::async_trait;

use crate::error::ConstructError;
use crate::tasks::destination::Destination;

/// Owned handle to a constructed network task.
pub type BoxNetworkTask = Box<dyn NetworkTask>;

/// # One attempt of the external network exchange.
///
/// `run` is awaited to completion by the scheduler worker; nothing else is dispatched
/// while it runs. The returned code follows the C convention: `0` is success, any
/// other value is a failure.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use cellvisor::NetworkTask;
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl NetworkTask for AlwaysOk {
///     async fn run(&mut self) -> i32 {
///         0
///     }
/// }
/// ```
#[async_trait]
pub trait NetworkTask: Send + 'static {
    /// Performs the full exchange (connect, handshake, request, response).
    async fn run(&mut self) -> i32;
}

/// # Builds network tasks for the supervisor.
///
/// Called once per cycle, before the watchdog is armed. An error here is treated
/// as a systemic fault and halts the supervisor.
pub trait TaskFactory: Send + Sync + 'static {
    /// Returns a stable, human-readable name (used in the boot event).
    fn name(&self) -> &str {
        "network-task"
    }

    /// Constructs a task bound to `dest`.
    fn create(&self, dest: &Destination) -> Result<BoxNetworkTask, ConstructError>;
}
