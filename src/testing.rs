//! Test doubles for the collaborator traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::error::ConstructError;
use crate::heartbeat::Indicator;
use crate::modem::{Level, ModemPowerControl};
use crate::tasks::{BoxNetworkTask, Destination, NetworkTask, TaskFactory};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Line {
    OnOff,
    PowerEnable,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct LineChange {
    pub at: Instant,
    pub line: Line,
    pub level: Level,
}

/// Modem lines that remember every write.
#[derive(Clone, Default)]
pub(crate) struct RecordingLines {
    log: Arc<Mutex<Vec<LineChange>>>,
}

impl RecordingLines {
    pub fn changes(&self) -> Vec<LineChange> {
        self.log.lock().unwrap().clone()
    }

    /// Last level written to `line`.
    pub fn level(&self, line: Line) -> Option<Level> {
        self.changes()
            .iter()
            .rev()
            .find(|c| c.line == line)
            .map(|c| c.level)
    }

    /// Number of completed power-offs (rail cuts).
    pub fn rail_cuts(&self) -> usize {
        self.changes()
            .iter()
            .filter(|c| c.line == Line::PowerEnable && c.level == Level::Low)
            .count()
    }

    fn push(&self, line: Line, level: Level) {
        self.log.lock().unwrap().push(LineChange {
            at: Instant::now(),
            line,
            level,
        });
    }
}

impl ModemPowerControl for RecordingLines {
    fn set_on_off(&mut self, level: Level) {
        self.push(Line::OnOff, level);
    }

    fn set_power_enable(&mut self, level: Level) {
        self.push(Line::PowerEnable, level);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingIndicator {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl RecordingIndicator {
    pub fn levels(&self) -> Vec<Level> {
        self.levels.lock().unwrap().clone()
    }
}

impl Indicator for RecordingIndicator {
    fn set(&mut self, level: Level) {
        self.levels.lock().unwrap().push(level);
    }
}

/// What the next constructed task does.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Step {
    /// Return the code immediately.
    Exit(i32),
    /// Return the code after a delay.
    After(Duration, i32),
    /// Block the calling thread, never yielding, then return the code.
    Block(Duration, i32),
    /// Never return.
    Hang,
    /// Fail construction.
    Refuse,
}

/// Factory that plays back a script of steps; refuses once the script runs out.
pub(crate) struct ScriptedFactory {
    steps: Mutex<VecDeque<Step>>,
    created: AtomicUsize,
    dropped: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            created: AtomicUsize::new(0),
            dropped: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl TaskFactory for ScriptedFactory {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create(&self, _dest: &Destination) -> Result<BoxNetworkTask, ConstructError> {
        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Refuse);
        match step {
            Step::Refuse => Err(ConstructError::OutOfMemory {
                requested: 64 * 1024,
            }),
            step => {
                self.created.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ScriptedTask {
                    step,
                    dropped: Arc::clone(&self.dropped),
                }))
            }
        }
    }
}

struct ScriptedTask {
    step: Step,
    dropped: Arc<AtomicUsize>,
}

#[async_trait]
impl NetworkTask for ScriptedTask {
    async fn run(&mut self) -> i32 {
        match self.step {
            Step::Exit(code) => code,
            Step::After(delay, code) => {
                time::sleep(delay).await;
                code
            }
            Step::Block(wedge, code) => {
                std::thread::sleep(wedge);
                code
            }
            Step::Hang | Step::Refuse => std::future::pending().await,
        }
    }
}

impl Drop for ScriptedTask {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}
