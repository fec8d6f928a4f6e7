//! # Deadline: single-shot watchdog on its own OS thread.
//!
//! [`Deadline`] owns a dedicated watchdog thread that sleeps on a condition variable
//! until the armed instant. If the owner does not [`disarm`](Deadline::disarm) it in
//! time, the thread publishes `WatchdogExpired` and sends [`Halt::WatchdogExpired`]
//! straight to the supervisor's halt channel.
//!
//! The watchdog shares no executor with the cycle it guards. A network task that
//! never yields (a blocking socket call, a busy loop) wedges the scheduler worker,
//! but the expiry still fires on time.
//!
//! ```text
//! arm(d, cycle) ──► slot = Some(now + d) ──► notify
//!                                               │
//! watchdog thread: wait_timeout(slot) ──────────┤
//!   ├─ slot taken by disarm() ─► keep waiting   │
//!   └─ deadline passed, slot still set ─► take slot, publish, send Halt
//! ```
//!
//! ## Rules
//! - At most one deadline is outstanding; arming again replaces the previous one
//! - `disarm()` with nothing armed is a no-op
//! - Disarm and expiry race on one lock: whichever takes the slot first wins, so a
//!   deadline fires at most once and never after a successful disarm
//! - Deadlines run on the monotonic wall clock, not on tokio's (pausable) clock
//! - Dropping the owner cancels any outstanding deadline and stops the thread

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    error::Halt,
    events::{Bus, Event, EventKind},
};

#[derive(Clone, Copy)]
struct Armed {
    expires: Instant,
    duration: Duration,
    cycle: u64,
}

#[derive(Default)]
struct Slot {
    armed: Option<Armed>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owned watchdog state. The only mutations are [`arm`](Self::arm) and [`disarm`](Self::disarm).
pub struct Deadline {
    bus: Bus,
    shared: Arc<Shared>,
}

impl Deadline {
    /// Starts the watchdog thread. Fails only if the OS refuses a new thread.
    pub fn new(bus: Bus, halt: mpsc::UnboundedSender<Halt>) -> std::io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let watched = Arc::clone(&shared);
        let thread_bus = bus.clone();

        thread::Builder::new()
            .name("cellvisor-watchdog".into())
            .spawn(move || watch(&watched, &thread_bus, &halt))?;

        Ok(Self { bus, shared })
    }

    /// Schedules the restart signal `duration` from now, on behalf of `cycle`.
    pub fn arm(&mut self, duration: Duration, cycle: u64) {
        {
            let mut slot = self.shared.lock();
            slot.armed = Some(Armed {
                expires: Instant::now() + duration,
                duration,
                cycle,
            });
        }
        self.shared.wake.notify_one();

        self.bus.publish(
            Event::new(EventKind::DeadlineArmed)
                .with_cycle(cycle)
                .with_timeout(duration),
        );
    }

    /// Cancels the outstanding deadline. Returns `false` if nothing was armed,
    /// including when the deadline already fired.
    pub fn disarm(&mut self) -> bool {
        let taken = self.shared.lock().armed.take();
        match taken {
            Some(armed) => {
                self.shared.wake.notify_one();
                self.bus
                    .publish(Event::new(EventKind::DeadlineDisarmed).with_cycle(armed.cycle));
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.shared.lock().armed.is_some()
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        {
            let mut slot = self.shared.lock();
            slot.armed = None;
            slot.closed = true;
        }
        self.shared.wake.notify_one();
    }
}

/// Watchdog thread body: waits for the armed instant, fires at most once per arm.
fn watch(shared: &Shared, bus: &Bus, halt: &mpsc::UnboundedSender<Halt>) {
    let mut slot = shared.lock();
    loop {
        if slot.closed {
            return;
        }
        let Some(armed) = slot.armed else {
            slot = shared.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let now = Instant::now();
        if now < armed.expires {
            slot = shared
                .wake
                .wait_timeout(slot, armed.expires - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        slot.armed = None;
        drop(slot);

        bus.publish(
            Event::new(EventKind::WatchdogExpired)
                .with_cycle(armed.cycle)
                .with_timeout(armed.duration),
        );
        let expired = Halt::WatchdogExpired {
            deadline: armed.duration,
            cycle: armed.cycle,
        };
        if let Err(lost) = halt.send(expired) {
            warn!(halt = %lost.0, "watchdog expired but nobody is listening for the halt");
        }

        slot = shared.lock();
    }
}
