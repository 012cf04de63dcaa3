//! Shared state for API handlers.

use vigil_core::Monitor;

/// State shared by every handler: a handle to the assembled core.
#[derive(Debug, Clone)]
pub struct ApiState {
    monitor: Monitor,
}

impl ApiState {
    /// Creates state around a monitor handle.
    #[must_use]
    pub const fn new(monitor: Monitor) -> Self {
        Self { monitor }
    }

    /// Returns the monitor.
    #[must_use]
    pub const fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Returns whether development mode is enabled.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.monitor.config().dev_mode
    }
}
