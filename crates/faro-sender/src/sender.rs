//! The one-shot distress send sequence
//!
//! Resolve identity, fix location under a bounded timeout, open a
//! transient session, register, publish the SOS, hold the named delivery
//! grace, close. Each step fails independently; there is no retry here
//! since retry policy belongs to the caller. The call returning, either way, is
//! the completion signal the calling context releases its indicator on.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use faro_core::{
    DistressEvent, FaroError, FaroResult, GeoPoint, DELIVERY_GRACE, LOCATION_TIMEOUT,
    REGISTER_GRACE,
};
use faro_transport::Connector;
use faro_wire::{encode_distress, encode_register};

use crate::{IdentityProvider, LocationProvider};

/// Sender tuning. The graces are deliberate, documented delays: the relay
/// needs a beat to bind a fresh registration, and the payload must drain
/// before the transient session closes.
#[derive(Clone, Debug)]
pub struct SenderConfig {
    pub location_timeout: Duration,
    pub register_grace: Duration,
    pub delivery_grace: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            location_timeout: LOCATION_TIMEOUT,
            register_grace: REGISTER_GRACE,
            delivery_grace: DELIVERY_GRACE,
        }
    }
}

/// Orchestrates one outbound distress report.
pub struct DistressSender {
    connector: Arc<dyn Connector>,
    identity: Arc<dyn IdentityProvider>,
    location: Arc<dyn LocationProvider>,
    config: SenderConfig,
}

impl DistressSender {
    pub fn new(
        connector: Arc<dyn Connector>,
        identity: Arc<dyn IdentityProvider>,
        location: Arc<dyn LocationProvider>,
        config: SenderConfig,
    ) -> Self {
        DistressSender {
            connector,
            identity,
            location,
            config,
        }
    }

    /// Run the whole sequence once. Returns the published event on
    /// success; any step's failure ends the sequence early.
    pub async fn send_distress(&self) -> FaroResult<DistressEvent> {
        let identity = self.identity.identity();
        let contact = self.identity.emergency_contact();
        if !identity.has_route() || contact.is_empty() {
            warn!("distress send aborted: no identity route or contact");
            return Err(FaroError::MissingIdentity);
        }

        // A report without coordinates is not sent.
        let location = self.acquire_location().await?;

        let session = self.connector.connect().await.map_err(|e| {
            warn!("distress send aborted: {}", e);
            e
        })?;

        session
            .sink
            .send(encode_register(identity.contact_handle())?)
            .await?;
        sleep(self.config.register_grace).await;

        let event = DistressEvent::sos(identity.alias(), location);
        session
            .sink
            .send(encode_distress(&identity, &contact, &event)?)
            .await?;

        sleep(self.config.delivery_grace).await;
        drop(session);

        info!(
            "distress published for {} to {} at {}",
            identity, contact, location
        );
        Ok(event)
    }

    async fn acquire_location(&self) -> FaroResult<GeoPoint> {
        match timeout(self.config.location_timeout, self.location.current_location()).await {
            Ok(Some(point)) => Ok(point),
            Ok(None) => {
                warn!("location provider returned no fix");
                Err(FaroError::LocationTimeout)
            }
            Err(_) => {
                warn!(
                    "location fix timed out after {:?}",
                    self.config.location_timeout
                );
                Err(FaroError::LocationTimeout)
            }
        }
    }
}
