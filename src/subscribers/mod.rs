//! # Event subscribers for the cellvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in implementations for events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! CycleLoop / Deadline / Supervisor ── publish(Event) ──► Bus
//!                                                          │
//!                                        subscriber listener (per boot)
//!                                                          │
//!                                                SubscriberSet::emit()
//!                                                          │
//!                                        ┌─────────────────┼──────────┐
//!                                        ▼                 ▼          ▼
//!                                    LogWriter        CycleStats    Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** observe and react to events (logging, uplink reports)
//! - **Stateful subscribers** keep state derived from events ([`CycleStats`])

mod log;
mod stats;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use stats::{CycleCounts, CycleStats};
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
