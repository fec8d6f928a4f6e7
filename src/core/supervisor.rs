//! # Supervisor: wires the cycle loop, heartbeat, watchdog and event delivery.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the configuration and
//! the collaborators. [`Supervisor::run`] boots one instance of the device logic and
//! returns only when that instance must stop, with the reason as a [`Halt`].
//!
//! ## High-level architecture
//! ```text
//! run():
//!   subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   publish Boot
//!
//!   Scheduler (worker thread)          Heartbeat (own task)
//!     └─► CycleLoop::run_cycle()         └─► Indicator::set() every period
//!           ├─ Deadline.arm() ───────────────────────────┐
//!           ├─ runner::run_once()                        │ expiry
//!           ├─ Deadline.disarm()                         ▼
//!           ├─ PowerSequencer::power_off()        halt channel ◄── construction failure
//!           └─ post(next cycle)                          │         scheduler refusal
//!                                                        ▼
//!   select! { halt channel, shutdown signal } ──► stop worker and heartbeat ──► Halt
//! ```
//!
//! ## Rules
//! - A `Supervisor` runs once; relaunching means building a new one
//!   (see [`run_forever`](crate::run_forever))
//! - Halting discards all in-memory state, including a half-finished network attempt
//! - Subscribers have processed every event published before `run` returns
//! - The watchdog runs on its own OS thread. Run on a multi-thread runtime, so that a
//!   task blocking its worker thread cannot also stall `run` and the heartbeat

use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{
    builder::SupervisorBuilder, config::Config, cycle::CycleLoop, scheduler::Scheduler, shutdown,
};
use crate::{
    error::{Halt, PostError},
    events::{Bus, Event, EventKind},
    heartbeat::{Heartbeat, Indicator},
    modem::{ModemPowerControl, PowerSequencer},
    subscribers::SubscriberSet,
    tasks::TaskFactory,
};

/// One boot of the device logic.
pub struct Supervisor<M, I> {
    cfg: Config,
    bus: Bus,
    subs: SubscriberSet,
    factory: Arc<dyn TaskFactory>,
    modem: M,
    indicator: I,
}

// Collaborator types are only fixed by `SupervisorBuilder::build`.
impl Supervisor<(), ()> {
    /// Returns a builder for the given configuration.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }
}

impl<M, I> Supervisor<M, I>
where
    M: ModemPowerControl,
    I: Indicator,
{
    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        factory: Arc<dyn TaskFactory>,
        modem: M,
        indicator: I,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            factory,
            modem,
            indicator,
        }
    }

    /// Event bus of this boot. Receivers created before [`run`](Self::run) see every event.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs cycles until something halts this boot.
    ///
    /// ### Halts
    /// - [`Halt::WatchdogExpired`]: a cycle outlived [`Config::watchdog`]
    /// - [`Halt::TaskConstruction`]: the factory could not build a task
    /// - [`Halt::WatchdogUnavailable`]: the watchdog thread could not be started
    /// - [`Halt::SchedulerClosed`]: the next cycle could not be posted
    /// - [`Halt::ShutdownRequested`]: a termination signal arrived (hosted only)
    pub async fn run(self) -> Halt {
        let Supervisor {
            cfg,
            bus,
            subs,
            factory,
            modem,
            indicator,
        } = self;

        let token = CancellationToken::new();
        let listener = subscriber_listener(&bus, subs, token.clone());
        bus.publish(
            Event::new(EventKind::Boot)
                .with_source(factory.name().to_string())
                .with_reason(format!(
                    "cellvisor {} -> {}",
                    env!("CARGO_PKG_VERSION"),
                    cfg.destination
                )),
        );

        let (halt_tx, mut halt_rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(cfg.queue_capacity_clamped());
        let cycle = CycleLoop::new(
            cfg.destination.clone(),
            cfg.cycle_budget(),
            factory,
            PowerSequencer::new(modem, cfg.holds()),
            scheduler.handle(),
            bus.clone(),
            halt_tx,
        );
        let heartbeat = Heartbeat::new(indicator, cfg.heartbeat_period).spawn(token.child_token());

        let halt = match cycle.map(CycleLoop::start) {
            Err(e) => Halt::WatchdogUnavailable {
                reason: e.to_string(),
            },
            Ok(Err(error)) => Halt::SchedulerClosed { error },
            Ok(Ok(())) => {
                spawn_worker(scheduler, token.child_token());
                tokio::select! {
                    h = halt_rx.recv() => h.unwrap_or(Halt::SchedulerClosed { error: PostError::Closed }),
                    _ = shutdown::shutdown_requested() => {
                        bus.publish(Event::new(EventKind::ShutdownRequested));
                        Halt::ShutdownRequested
                    }
                }
            }
        };

        token.cancel();
        let _ = heartbeat.await;
        let _ = listener.await;
        halt
    }
}

/// Runs the scheduler until `stop` is cancelled, dropping whatever job is in flight.
///
/// On a multi-thread runtime the worker gets a blocking-pool thread of its own, so a
/// task that never yields shares no worker (and no run queue) with the heartbeat,
/// the subscriber listener or [`Supervisor::run`]. A current-thread runtime has no
/// second thread to give; there the worker is an ordinary task.
fn spawn_worker(scheduler: Scheduler, stop: CancellationToken) {
    let work = async move {
        tokio::select! {
            biased;
            _ = stop.cancelled() => {}
            _ = scheduler.dispatch_forever() => {}
        }
    };

    let handle = Handle::current();
    match handle.runtime_flavor() {
        RuntimeFlavor::MultiThread => {
            let rt = handle.clone();
            handle.spawn_blocking(move || rt.block_on(work));
        }
        _ => {
            tokio::spawn(work);
        }
    }
}

/// Forwards bus events to the subscriber set until `token` is cancelled,
/// then flushes whatever is still buffered and waits for every subscriber
/// worker to drain its queue.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        subs.emit(&ev);
                    }
                    break;
                }
            }
        }
        subs.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::{CycleStats, Subscribe};
    use crate::testing::{RecordingIndicator, RecordingLines, ScriptedFactory, Step};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};
    use tokio::sync::broadcast;
    use tokio::time;

    struct Harness {
        sup: Supervisor<RecordingLines, RecordingIndicator>,
        events: broadcast::Receiver<Event>,
        lines: RecordingLines,
        led: RecordingIndicator,
        stats: Arc<CycleStats>,
    }

    fn harness(steps: impl IntoIterator<Item = Step>) -> Harness {
        harness_with(Config::default(), steps, Vec::new())
    }

    fn harness_with(
        cfg: Config,
        steps: impl IntoIterator<Item = Step>,
        mut subs: Vec<Arc<dyn Subscribe>>,
    ) -> Harness {
        let lines = RecordingLines::default();
        let led = RecordingIndicator::default();
        let stats = Arc::new(CycleStats::new());
        subs.push(stats.clone() as Arc<dyn Subscribe>);
        let sup = Supervisor::builder(cfg)
            .with_subscribers(subs)
            .build(ScriptedFactory::new(steps), lines.clone(), led.clone());
        let events = sup.bus().subscribe();
        Harness {
            sup,
            events,
            lines,
            led,
            stats,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Subscriber that takes a full second of (virtual) time per event.
    #[derive(Default)]
    struct Sluggish {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Sluggish {
        async fn on_event(&self, _ev: &Event) {
            time::sleep(Duration::from_secs(1)).await;
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "sluggish"
        }

        fn queue_capacity(&self) -> usize {
            1024
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_success_powers_down_once() {
        let mut h = harness([Step::Exit(0)]);
        let halt = h.sup.run().await;

        assert!(matches!(halt, Halt::TaskConstruction { .. }));
        assert_eq!(h.lines.rail_cuts(), 1);

        let counts = h.stats.snapshot().await;
        assert_eq!(counts.successes, 1);
        assert_eq!(counts.failures, 0);
        assert_eq!(counts.power_downs, 1);
        assert_eq!(counts.requeues, 1);
        assert_eq!(counts.watchdog_expiries, 0);

        let events = drain(&mut h.events);
        assert_eq!(events[0].kind, EventKind::Boot);
        assert_eq!(events[0].source.as_deref(), Some("scripted"));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_retry_like_successes() {
        let mut h = harness([Step::Exit(1), Step::Exit(1), Step::Exit(0)]);
        let halt = h.sup.run().await;

        assert!(matches!(halt, Halt::TaskConstruction { .. }));
        assert_eq!(h.lines.rail_cuts(), 3);

        let counts = h.stats.snapshot().await;
        assert_eq!(counts.cycles, 4);
        assert_eq!(counts.failures, 2);
        assert_eq!(counts.successes, 1);
        assert_eq!(counts.power_downs, 3);
        assert_eq!(counts.requeues, 3);
        assert_eq!(counts.watchdog_expiries, 0);

        // same transitions per cycle, only the outcome event differs
        let events = drain(&mut h.events);
        let shape = |cycle: u64| -> Vec<EventKind> {
            events
                .iter()
                .filter(|e| e.cycle == Some(cycle))
                .map(|e| match e.kind {
                    EventKind::TaskFailed | EventKind::TaskSucceeded => EventKind::TaskSucceeded,
                    kind => kind,
                })
                .collect()
        };
        assert_eq!(shape(1), shape(3));
        assert_eq!(shape(2), shape(3));
        assert_eq!(shape(3).len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn construction_failure_halts_without_arming() {
        let mut h = harness([Step::Refuse]);
        let halt = h.sup.run().await;

        assert_eq!(
            halt,
            Halt::TaskConstruction {
                reason: "failed to allocate network task (65536 bytes)".into()
            }
        );
        assert!(h.lines.changes().is_empty());
        let events = drain(&mut h.events);
        assert!(events.iter().all(|e| !e.is_deadline()));
        assert!(events
            .iter()
            .any(|e| e.kind == EventKind::TaskConstructionFailed));
    }

    fn quick_watchdog() -> Config {
        Config {
            watchdog: Duration::from_millis(200),
            heartbeat_period: Duration::from_millis(20),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn hung_task_restarts_at_watchdog() {
        let mut h = harness_with(quick_watchdog(), [Step::Hang], Vec::new());
        let start = Instant::now();
        let halt = h.sup.run().await;
        let elapsed = start.elapsed();

        assert_eq!(
            halt,
            Halt::WatchdogExpired {
                deadline: Duration::from_millis(200),
                cycle: 1
            }
        );
        assert!(elapsed >= Duration::from_millis(200), "elapsed={elapsed:?}");
        assert!(h.lines.changes().is_empty());

        let expiries = drain(&mut h.events)
            .into_iter()
            .filter(|e| e.kind == EventKind::WatchdogExpired)
            .count();
        assert_eq!(expiries, 1);
        assert_eq!(h.stats.snapshot().await.watchdog_expiries, 1);

        // heartbeat kept toggling while the worker was stuck
        let blinks = h.led.levels().len();
        assert!(blinks >= 5, "blinks={blinks}");
        assert!(blinks as u128 <= elapsed.as_millis() / 20 + 1, "blinks={blinks}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn task_that_never_yields_still_restarts_at_watchdog() {
        let cfg = quick_watchdog();
        let mut h = harness_with(
            cfg.clone(),
            [Step::Block(Duration::from_millis(1500), 0)],
            Vec::new(),
        );
        let start = Instant::now();
        let halt = h.sup.run().await;
        let elapsed = start.elapsed();

        assert_eq!(
            halt,
            Halt::WatchdogExpired {
                deadline: cfg.watchdog,
                cycle: 1
            }
        );
        assert!(elapsed >= cfg.watchdog, "elapsed={elapsed:?}");
        assert!(elapsed < Duration::from_millis(1200), "elapsed={elapsed:?}");
        assert!(h.lines.changes().is_empty());
        assert!(drain(&mut h.events)
            .iter()
            .all(|e| e.kind != EventKind::TaskSucceeded));

        // the heartbeat lives on another worker and kept blinking
        let blinks = h.led.levels().len();
        assert!(blinks >= 3, "blinks={blinks}");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_finish_before_run_returns() {
        let sluggish = Arc::new(Sluggish::default());
        let mut h = harness_with(
            Config::default(),
            [Step::Exit(1), Step::Exit(0)],
            vec![sluggish.clone() as Arc<dyn Subscribe>],
        );
        h.sup.run().await;

        let published = drain(&mut h.events).len();
        assert_eq!(sluggish.seen.load(Ordering::SeqCst), published);

        let counts = h.stats.snapshot().await;
        assert_eq!(counts.cycles, 3);
        assert_eq!(counts.power_downs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_disarmed_during_every_power_down() {
        let mut h = harness([
            Step::Exit(1),
            Step::After(Duration::from_secs(120), 0),
            Step::Exit(-2),
            Step::After(Duration::from_secs(299), 0),
        ]);
        let halt = h.sup.run().await;
        assert!(matches!(halt, Halt::TaskConstruction { .. }));

        let mut armed = false;
        let mut powering = false;
        let mut power_downs = 0;
        for ev in drain(&mut h.events) {
            match ev.kind {
                EventKind::DeadlineArmed => {
                    assert!(!powering, "armed during power-down");
                    armed = true;
                }
                EventKind::DeadlineDisarmed => armed = false,
                EventKind::PowerDownStarted => {
                    assert!(!armed, "power-down with deadline armed");
                    powering = true;
                }
                EventKind::PowerDownCompleted => {
                    powering = false;
                    power_downs += 1;
                }
                EventKind::WatchdogExpired => panic!("no restart expected"),
                _ => {}
            }
        }
        assert_eq!(power_downs, 4);
    }
}
