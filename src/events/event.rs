//! # Runtime events emitted by the supervisor and its cycles.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Boot events**: a fresh supervisor came up (restarts are visible in the stream)
//! - **Cycle events**: the attempt/cleanup flow (starting, outcome, power-down, requeue)
//! - **Deadline events**: watchdog arm/disarm/expiry
//! - **Subscriber events**: overflow and panic reports from the fan-out workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, cycle number,
//! outcome code and the armed deadline.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use cellvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_cycle(3)
//!     .with_code(-3001)
//!     .with_timeout(Duration::from_secs(300));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.cycle, Some(3));
//! assert_eq!(ev.code, Some(-3001));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Boot ===
    /// A supervisor started running.
    ///
    /// Sets:
    /// - `reason`: crate version and destination
    /// - `source`: task factory name
    Boot,

    // === Cycle lifecycle ===
    /// The scheduler dispatched a cycle.
    ///
    /// Sets:
    /// - `cycle`: cycle number (1-based, per boot)
    CycleStarting,

    /// The network task could not be constructed; the supervisor halts.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `reason`: construction error
    TaskConstructionFailed,

    /// The network task returned outcome code `0`.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `code`: always `0`
    TaskSucceeded,

    /// The network task returned a nonzero outcome code.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `code`: the outcome code
    TaskFailed,

    /// The modem power-down sequence started.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    PowerDownStarted,

    /// The modem power-down sequence completed.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    PowerDownCompleted,

    /// The next cycle was posted to the scheduler.
    ///
    /// Sets:
    /// - `cycle`: the cycle that just finished
    CycleRequeued,

    // === Deadline ===
    /// The watchdog deadline was armed.
    ///
    /// Sets:
    /// - `cycle`: owning cycle
    /// - `timeout_ms`: armed duration (ms)
    DeadlineArmed,

    /// The watchdog deadline was cancelled before expiry.
    ///
    /// Sets:
    /// - `cycle`: owning cycle
    DeadlineDisarmed,

    /// The watchdog deadline expired; the supervisor is about to halt for relaunch.
    ///
    /// Sets:
    /// - `cycle`: owning cycle
    /// - `timeout_ms`: armed duration (ms)
    WatchdogExpired,

    // === Shutdown ===
    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Cycle number (starting from 1 on every boot).
    pub cycle: Option<u64>,
    /// Outcome code reported by the network task.
    pub code: Option<i32>,
    /// Deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Name of the emitting component, if not the cycle itself.
    pub source: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            cycle: None,
            code: None,
            timeout_ms: None,
            reason: None,
            source: None,
        }
    }

    /// Attaches a cycle number.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches an outcome code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a deadline (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting component name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for events that belong to the deadline lifecycle.
    #[inline]
    pub fn is_deadline(&self) -> bool {
        matches!(
            self.kind,
            EventKind::DeadlineArmed | EventKind::DeadlineDisarmed | EventKind::WatchdogExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::CycleStarting);
        let b = Event::new(EventKind::CycleStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_saturates() {
        let ev = Event::new(EventKind::DeadlineArmed).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));

        let ev = Event::new(EventKind::DeadlineArmed).with_timeout(Duration::from_secs(300));
        assert_eq!(ev.timeout_ms, Some(300_000));
    }

    #[test]
    fn overflow_event_names_subscriber() {
        let ev = Event::subscriber_overflow("stats", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.source.as_deref(), Some("stats"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=stats reason=full"));
    }
}
