//! Online/offline detection gating download starts.
//!
//! The platform connectivity signal is an injected capability so tests
//! can fake transitions deterministically. The monitor is event-driven
//! (no polling): whoever owns the platform signal pushes transitions via
//! [`NetworkStatusMonitor::set_online`], and observers watch the change
//! channel.
//!
//! Fail open: with no reliable signal the monitor defaults to online, so
//! functionality is not needlessly blocked. A failed fetch is the
//! authoritative sign of unreachability, not this monitor.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument};

/// Injected connectivity signal.
pub trait Connectivity: Send + Sync {
    /// Current best-effort online state.
    fn is_online(&self) -> bool;
}

/// Connectivity source that always reports online (the fail-open default).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Tracks online/offline state and notifies observers of transitions.
#[derive(Debug, Clone)]
pub struct NetworkStatusMonitor {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for NetworkStatusMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStatusMonitor {
    /// Creates a monitor in the fail-open (online) state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(true)
    }

    /// Creates a monitor with an explicit initial state.
    #[must_use]
    pub fn with_initial(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a monitor seeded from a platform connectivity signal.
    #[must_use]
    pub fn from_signal(signal: &dyn Connectivity) -> Self {
        Self::with_initial(signal.is_online())
    }

    /// Current online state.
    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Records a connectivity transition from the platform signal.
    #[instrument(skip(self))]
    pub fn set_online(&self, online: bool) {
        // send_if_modified keeps observers quiet on duplicate reports
        let changed = self.sender.send_if_modified(|state| {
            if *state == online {
                false
            } else {
                *state = online;
                true
            }
        });
        if changed {
            debug!(online, "connectivity changed");
        }
    }

    /// Subscribes to connectivity transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Gate for starting a download: false immediately when offline,
    /// without touching the network.
    #[must_use]
    pub fn request_permission_to_download(&self) -> bool {
        self.is_online()
    }
}
