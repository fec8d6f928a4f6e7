//! # CycleLoop: the watchdog-guarded retry cycle.
//!
//! One cycle is one attempt of the network task plus modem cleanup. The loop owns
//! everything a cycle touches (deadline, power sequencer, factory) and moves that
//! state from one cycle into the next by posting itself back onto the scheduler.
//!
//! ## State machine
//! ```text
//!   ┌──────► Idle ── scheduler dispatch ──► Arming
//!   │                                         │ construct task (failure ─► Halt::TaskConstruction)
//!   │                                         │ arm deadline
//!   │                                         ▼
//!   │                                      Running ── task.run() to completion
//!   │                                         ▼
//!   │                                     Disarming ── deadline.disarm()
//!   │                                         ▼
//!   │                                    PoweringDown ── sequencer.power_off() (blocking holds)
//!   │                                         ▼
//!   └──────────────────────────────────── Requeued ── scheduler.post(next cycle)
//!
//!   deadline expiry (anywhere in Running) ─► Halt::WatchdogExpired, bypassing the loop
//! ```
//!
//! ## Rules
//! - Success and failure take the **same** path: there is no backoff, no retry limit
//! - The deadline is always disarmed **before** the power sequence starts
//! - The next cycle is posted only **after** the power sequence completes
//! - The cycle counter is diagnostic only; it never alters control flow

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::{
    core::{
        deadline::Deadline,
        runner,
        scheduler::{Job, SchedulerHandle},
    },
    error::{Halt, PostError},
    events::{Bus, Event, EventKind},
    modem::{ModemPowerControl, PowerSequencer},
    tasks::{Destination, TaskFactory},
};

/// Where the loop is within its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Arming,
    Running,
    Disarming,
    PoweringDown,
    Requeued,
}

/// Self-reposting cycle state.
pub struct CycleLoop<M> {
    destination: Destination,
    watchdog: Duration,
    factory: Arc<dyn TaskFactory>,
    deadline: Deadline,
    sequencer: PowerSequencer<M>,
    scheduler: SchedulerHandle,
    bus: Bus,
    halt: mpsc::UnboundedSender<Halt>,
    cycle: u64,
    phase: CyclePhase,
}

impl<M: ModemPowerControl> CycleLoop<M> {
    /// Builds the loop and starts its watchdog thread.
    pub fn new(
        destination: Destination,
        watchdog: Duration,
        factory: Arc<dyn TaskFactory>,
        sequencer: PowerSequencer<M>,
        scheduler: SchedulerHandle,
        bus: Bus,
        halt: mpsc::UnboundedSender<Halt>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            destination,
            watchdog,
            factory,
            deadline: Deadline::new(bus.clone(), halt.clone())?,
            sequencer,
            scheduler,
            bus,
            halt,
            cycle: 0,
            phase: CyclePhase::Idle,
        })
    }

    /// Posts the first cycle. Called once at startup.
    pub fn start(self) -> Result<(), PostError> {
        let scheduler = self.scheduler.clone();
        scheduler.post_job(self.into_job())
    }

    fn into_job(self) -> Job {
        Box::pin(self.run_cycle())
    }

    fn enter(&mut self, phase: CyclePhase) {
        trace!(cycle = self.cycle, from = ?self.phase, to = ?phase, "cycle phase");
        self.phase = phase;
    }

    fn signal_halt(&self, halt: Halt) {
        if let Err(lost) = self.halt.send(halt) {
            warn!(cycle = self.cycle, halt = %lost.0, "halt dropped: supervisor is gone");
        }
    }

    /// Posts the next cycle. The loop stays `Requeued` until a queue slot is secured
    /// and goes back to `Idle` only once the post cannot fail anymore.
    fn requeue(mut self) -> Result<(), (Self, PostError)> {
        self.enter(CyclePhase::Requeued);
        let scheduler = self.scheduler.clone();
        let permit = match scheduler.try_reserve() {
            Ok(permit) => permit,
            Err(e) => return Err((self, e)),
        };
        self.enter(CyclePhase::Idle);
        permit.send(self.into_job());
        Ok(())
    }

    async fn run_cycle(mut self) {
        self.cycle += 1;
        self.enter(CyclePhase::Arming);
        self.bus
            .publish(Event::new(EventKind::CycleStarting).with_cycle(self.cycle));

        let task = match runner::construct(
            self.factory.as_ref(),
            &self.destination,
            self.cycle,
            &self.bus,
        ) {
            Ok(task) => task,
            Err(e) => {
                self.signal_halt(Halt::TaskConstruction {
                    reason: e.to_string(),
                });
                return;
            }
        };
        self.deadline.arm(self.watchdog, self.cycle);

        self.enter(CyclePhase::Running);
        let _outcome = runner::run_once(task, self.cycle, &self.bus).await;

        self.enter(CyclePhase::Disarming);
        self.deadline.disarm();

        self.enter(CyclePhase::PoweringDown);
        self.bus
            .publish(Event::new(EventKind::PowerDownStarted).with_cycle(self.cycle));
        self.sequencer.power_off().await;
        self.bus
            .publish(Event::new(EventKind::PowerDownCompleted).with_cycle(self.cycle));

        let cycle = self.cycle;
        let bus = self.bus.clone();
        match self.requeue() {
            Ok(()) => bus.publish(Event::new(EventKind::CycleRequeued).with_cycle(cycle)),
            Err((this, error)) => this.signal_halt(Halt::SchedulerClosed { error }),
        }
    }
}
