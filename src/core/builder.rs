use std::sync::Arc;

use super::{config::Config, supervisor::Supervisor};
use crate::{
    events::Bus,
    heartbeat::Indicator,
    modem::ModemPowerControl,
    subscribers::{Subscribe, SubscriberSet},
    tasks::TaskFactory,
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (cycles, outcomes, watchdog, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor around its collaborators.
    ///
    /// Spawns the subscriber workers, so it must be called inside a tokio runtime.
    pub fn build<M, I>(self, factory: Arc<dyn TaskFactory>, modem: M, indicator: I) -> Supervisor<M, I>
    where
        M: ModemPowerControl,
        I: Indicator,
    {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        Supervisor::new_internal(self.cfg, bus, subs, factory, modem, indicator)
    }
}
