//! The dependency probe capability.
//!
//! A probe is an asynchronous function the core consumes from external
//! collaborators: a database client ping, an HTTP request to an upstream
//! API, an OS resource reader. The core only sees the [`DependencyProbe`]
//! trait; what happens inside is the collaborator's business.

use std::future::Future;
use std::pin::Pin;

use crate::types::ProbeReport;

/// Boxed future type for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The outcome of a probe invocation, before timeout handling.
pub type ProbeOutcome = std::result::Result<ProbeReport, Box<dyn std::error::Error + Send + Sync>>;

/// An asynchronous health probe for one dependency.
pub trait DependencyProbe: Send + Sync {
    /// Probes the dependency once.
    ///
    /// The runner bounds this call with the dependency's configured timeout;
    /// implementations do not need their own deadline.
    fn probe(&self) -> BoxFuture<'_, ProbeOutcome>;
}

/// Adapts a closure returning a future into a [`DependencyProbe`].
pub struct FnProbe<F>(F);

impl<F, Fut> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    /// Wraps the closure.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, Fut> DependencyProbe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    fn probe(&self) -> BoxFuture<'_, ProbeOutcome> {
        Box::pin((self.0)())
    }
}
