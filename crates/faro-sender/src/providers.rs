//! Collaborator seams for the send sequence
//!
//! Identity and location come from outside the core. Both seams are
//! read-only from the core's perspective; the timeout around location
//! acquisition belongs to the sender, not the provider.

use std::future::Future;
use std::pin::Pin;

use faro_core::{GeoPoint, Identity};

/// Boxed location future, keeps the provider seam object-safe.
pub type LocationFuture = Pin<Box<dyn Future<Output = Option<GeoPoint>> + Send>>;

/// Produces the device's current coordinates, or `None` when no fix is
/// possible. The sender bounds the wait.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> LocationFuture;
}

/// Session context: who this device is and who to alert.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Identity;
    fn emergency_contact(&self) -> String;
}

/// Fixed in-memory providers, for tests and simple hosts.
pub struct StaticProviders {
    identity: Identity,
    emergency_contact: String,
    location: Option<GeoPoint>,
}

impl StaticProviders {
    pub fn new(identity: Identity, emergency_contact: impl Into<String>) -> Self {
        StaticProviders {
            identity,
            emergency_contact: emergency_contact.into(),
            location: Some(GeoPoint::default()),
        }
    }

    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self
    }
}

impl IdentityProvider for StaticProviders {
    fn identity(&self) -> Identity {
        self.identity.clone()
    }

    fn emergency_contact(&self) -> String {
        self.emergency_contact.clone()
    }
}

impl LocationProvider for StaticProviders {
    fn current_location(&self) -> LocationFuture {
        let location = self.location;
        Box::pin(async move { location })
    }
}

/// Location provider that never resolves, for timeout tests.
pub struct NeverLocation;

impl LocationProvider for NeverLocation {
    fn current_location(&self) -> LocationFuture {
        Box::pin(std::future::pending())
    }
}
