//! # Function-backed factory (`FactoryFn`)
//!
//! [`FactoryFn`] wraps a closure `F: Fn(&Destination) -> Result<BoxNetworkTask, ConstructError>`,
//! producing a fresh task per cycle. The closure owns no per-cycle state; if tasks need
//! shared resources (a TLS config, a socket pool), capture them in an `Arc` explicitly.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use cellvisor::{BoxNetworkTask, ConstructError, Destination, FactoryFn, NetworkTask, TaskFactory};
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl NetworkTask for Ping {
//!     async fn run(&mut self) -> i32 { 0 }
//! }
//!
//! let factory = FactoryFn::arc("ping", |_dest: &Destination| {
//!     Ok::<_, ConstructError>(Box::new(Ping) as BoxNetworkTask)
//! });
//! assert_eq!(factory.name(), "ping");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::ConstructError;
use crate::tasks::destination::Destination;
use crate::tasks::task::{BoxNetworkTask, TaskFactory};

/// Function-backed factory implementation.
#[derive(Debug)]
pub struct FactoryFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FactoryFn<F>
where
    F: Fn(&Destination) -> Result<BoxNetworkTask, ConstructError> + Send + Sync + 'static,
{
    /// Creates a new function-backed factory.
    ///
    /// Prefer [`FactoryFn::arc`] when you immediately need a shared handle.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> TaskFactory for FactoryFn<F>
where
    F: Fn(&Destination) -> Result<BoxNetworkTask, ConstructError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, dest: &Destination) -> Result<BoxNetworkTask, ConstructError> {
        (self.f)(dest)
    }
}
