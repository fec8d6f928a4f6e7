//! # CycleStats: running counters over the cycle event stream.
//!
//! ## Internal scheme
//! ```text
//! on_event(ev):
//!   ├─ CycleStarting      => cycles += 1
//!   ├─ TaskSucceeded      => successes += 1
//!   ├─ TaskFailed         => failures += 1
//!   ├─ PowerDownCompleted => power_downs += 1
//!   ├─ CycleRequeued      => requeues += 1
//!   ├─ WatchdogExpired    => watchdog_expiries += 1
//!   └─ otherwise: ignore
//!
//! snapshot() -> CycleCounts (copy of the counters)
//! ```
//!
//! Counters span every boot the subscriber is attached to, so one instance shared
//! across relaunches sees the totals of the whole process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounts {
    pub cycles: u64,
    pub successes: u64,
    pub failures: u64,
    pub power_downs: u64,
    pub requeues: u64,
    pub watchdog_expiries: u64,
}

/// Counts cycle outcomes seen on the bus.
pub struct CycleStats {
    inner: RwLock<CycleCounts>,
    capacity: usize,
}

impl CycleStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CycleCounts::default()),
            capacity: 1024,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub async fn snapshot(&self) -> CycleCounts {
        *self.inner.read().await
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for CycleStats {
    async fn on_event(&self, ev: &Event) {
        let mut c = self.inner.write().await;
        match ev.kind {
            EventKind::CycleStarting => c.cycles += 1,
            EventKind::TaskSucceeded => c.successes += 1,
            EventKind::TaskFailed => c.failures += 1,
            EventKind::PowerDownCompleted => c.power_downs += 1,
            EventKind::CycleRequeued => c.requeues += 1,
            EventKind::WatchdogExpired => c.watchdog_expiries += 1,
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "CycleStats"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}
