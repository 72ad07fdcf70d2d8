//! Device location adapter.
//!
//! The platform location service is a black box that emits [`LocationEvent`]s
//! and can be asked to start delivering fixes. [`DeviceLocation`] keeps the
//! most recent fix and never surfaces location errors to its callers.

use parking_lot::RwLock;
use std::{fmt::Debug, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::Coordinates;

/// Anything that can report where the device is right now.
pub trait LocationProvider: Send + Sync + Debug {
    fn current_coordinates(&self) -> Option<Coordinates>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    AuthorizationChanged(AuthorizationStatus),
    Fix(Coordinates),
    Failed(String),
}

/// Control surface of the platform location service.
pub trait LocationBackend: Send + Sync + Debug {
    /// Begin (or keep) delivering fixes. Called on every authorized status change.
    fn start_updating(&self);
}

#[derive(Debug, Clone)]
pub struct DeviceLocation {
    backend: Arc<dyn LocationBackend>,
    last_fix: Arc<RwLock<Option<Coordinates>>>,
}

impl DeviceLocation {
    pub fn new(backend: Arc<dyn LocationBackend>) -> Self {
        Self {
            backend,
            last_fix: Arc::new(RwLock::new(None)),
        }
    }

    pub fn handle_event(&self, event: LocationEvent) {
        match event {
            LocationEvent::AuthorizationChanged(status) if status.is_authorized() => {
                debug!(?status, "Location authorized, requesting updates");
                self.backend.start_updating();
            }
            LocationEvent::AuthorizationChanged(status) => {
                debug!(?status, "Location not authorized");
            }
            LocationEvent::Fix(coords) => {
                *self.last_fix.write() = Some(coords);
            }
            LocationEvent::Failed(reason) => {
                warn!(%reason, "Location update failed");
            }
        }
    }

    /// Drain platform events until the sender side is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<LocationEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("Location event stream closed");
    }
}

impl LocationProvider for DeviceLocation {
    fn current_coordinates(&self) -> Option<Coordinates> {
        *self.last_fix.read()
    }
}

/// A provider that always reports the same position, or none.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl LocationProvider for FixedLocation {
    fn current_coordinates(&self) -> Option<Coordinates> {
        self.0
    }
}
