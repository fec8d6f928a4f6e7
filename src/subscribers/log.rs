//! # LogWriter: events as structured `tracing` records.
//!
//! Cycle chatter goes out at `debug`, outcomes and boots at `info`,
//! and anything that ends a boot or loses events at `warn`/`error`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  cellvisor: boot source="tcp-probe" reason="cellvisor 0.1.0 -> os.mbed.com:443"
//! INFO  cellvisor: network task succeeded cycle=1 code=0
//! DEBUG cellvisor: modem powered down cycle=1
//! WARN  cellvisor: network task failed cycle=2 code=-3004
//! ERROR cellvisor: watchdog expired cycle=3 timeout_ms=300000
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let cycle = e.cycle.unwrap_or_default();
        match e.kind {
            EventKind::Boot => {
                info!(
                    target: "cellvisor",
                    source = e.source.as_deref().unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or(""),
                    "boot"
                );
            }
            EventKind::CycleStarting => debug!(target: "cellvisor", cycle, "cycle starting"),
            EventKind::TaskConstructionFailed => {
                error!(
                    target: "cellvisor",
                    cycle,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "network task construction failed"
                );
            }
            EventKind::TaskSucceeded => {
                info!(target: "cellvisor", cycle, code = e.code, "network task succeeded");
            }
            EventKind::TaskFailed => {
                warn!(target: "cellvisor", cycle, code = e.code, "network task failed");
            }
            EventKind::PowerDownStarted => debug!(target: "cellvisor", cycle, "powering modem down"),
            EventKind::PowerDownCompleted => debug!(target: "cellvisor", cycle, "modem powered down"),
            EventKind::CycleRequeued => debug!(target: "cellvisor", cycle, "next cycle posted"),
            EventKind::DeadlineArmed => {
                debug!(target: "cellvisor", cycle, timeout_ms = e.timeout_ms, "watchdog armed");
            }
            EventKind::DeadlineDisarmed => debug!(target: "cellvisor", cycle, "watchdog disarmed"),
            EventKind::WatchdogExpired => {
                error!(target: "cellvisor", cycle, timeout_ms = e.timeout_ms, "watchdog expired");
            }
            EventKind::ShutdownRequested => info!(target: "cellvisor", "shutdown requested"),
            EventKind::SubscriberOverflow => {
                warn!(
                    target: "cellvisor",
                    subscriber = e.source.as_deref().unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber dropped an event"
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    target: "cellvisor",
                    subscriber = e.source.as_deref().unwrap_or("unknown"),
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory sink for the fmt layer.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        /// Level of the first record whose message contains `msg`.
        fn level_of(&self, msg: &str) -> Option<String> {
            let out = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            out.lines()
                .find(|l| l.contains(msg))
                .and_then(|l| l.split_whitespace().next())
                .map(str::to_owned)
        }

        fn line_with(&self, msg: &str) -> String {
            let out = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            out.lines()
                .find(|l| l.contains(msg))
                .unwrap_or_default()
                .to_owned()
        }
    }

    #[tokio::test]
    async fn levels_follow_severity() {
        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let log = LogWriter::new();
        for ev in [
            Event::new(EventKind::TaskSucceeded).with_cycle(1).with_code(0),
            Event::new(EventKind::TaskFailed).with_cycle(2).with_code(-3004),
            Event::new(EventKind::WatchdogExpired)
                .with_cycle(3)
                .with_timeout(std::time::Duration::from_secs(300)),
            Event::new(EventKind::PowerDownCompleted).with_cycle(2),
            Event::subscriber_overflow("stats", "full"),
        ] {
            log.on_event(&ev).await;
        }

        assert_eq!(capture.level_of("network task succeeded").as_deref(), Some("INFO"));
        assert_eq!(capture.level_of("network task failed").as_deref(), Some("WARN"));
        assert_eq!(capture.level_of("watchdog expired").as_deref(), Some("ERROR"));
        assert_eq!(capture.level_of("modem powered down").as_deref(), Some("DEBUG"));
        assert_eq!(capture.level_of("subscriber dropped").as_deref(), Some("WARN"));

        let failed = capture.line_with("network task failed");
        assert!(failed.contains("cycle=2"), "{failed}");
        assert!(failed.contains("code=-3004"), "{failed}");
        assert!(capture
            .line_with("watchdog expired")
            .contains("timeout_ms=300000"));
    }
}
