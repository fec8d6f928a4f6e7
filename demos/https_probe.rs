//! # Example: TCP reachability probe under the watchdog
//!
//! Runs the full supervised cycle on a host: every cycle opens a TCP connection to the
//! configured destination, "powers down" a traced pair of modem lines, and goes again.
//! The heartbeat LED and the line levels are printed through `tracing`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example https_probe
//! ```
//!
//! Press Ctrl-C to stop.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cellvisor::{
    run_forever, BoxNetworkTask, Config, CycleStats, Destination, FactoryFn, Halt, Indicator,
    Level, LogWriter, ModemPowerControl, NetworkTask, Relauncher, Subscribe, Supervisor,
};
use tokio::net::TcpStream;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

/// Opens one TCP connection; the outcome code is the OS error, or -1 when there is none.
struct TcpProbe {
    dest: Destination,
}

#[async_trait]
impl NetworkTask for TcpProbe {
    async fn run(&mut self) -> i32 {
        match TcpStream::connect((self.dest.address.as_ref(), self.dest.port)).await {
            Ok(stream) => {
                debug!(peer = ?stream.peer_addr().ok(), host = %self.dest.hostname, "connected");
                0
            }
            Err(err) => {
                info!(%err, dest = %self.dest, "connect failed");
                err.raw_os_error().unwrap_or(-1)
            }
        }
    }
}

struct TracedLines;

impl ModemPowerControl for TracedLines {
    fn set_on_off(&mut self, level: Level) {
        info!(?level, "modem on_off");
    }

    fn set_power_enable(&mut self, level: Level) {
        info!(?level, "modem power_enable");
    }
}

struct TracedLed;

impl Indicator for TracedLed {
    fn set(&mut self, level: Level) {
        trace!(?level, "led");
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config {
        watchdog: Duration::from_secs(60),
        ..Config::default()
    };
    let stats = Arc::new(CycleStats::new());
    let factory = FactoryFn::arc("tcp-probe", |dest: &Destination| {
        Ok(Box::new(TcpProbe { dest: dest.clone() }) as BoxNetworkTask)
    });

    let mut restart = Relauncher::new();
    let halt = run_forever(
        || {
            Supervisor::builder(cfg.clone())
                .with_subscribers(vec![
                    Arc::new(LogWriter::new()) as Arc<dyn Subscribe>,
                    stats.clone() as Arc<dyn Subscribe>,
                ])
                .build(factory.clone(), TracedLines, TracedLed)
        },
        &mut restart,
    )
    .await;

    let counts = stats.snapshot().await;
    info!(
        relaunches = restart.relaunches(),
        cycles = counts.cycles,
        successes = counts.successes,
        failures = counts.failures,
        "stopped"
    );

    match halt {
        Halt::ShutdownRequested => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
