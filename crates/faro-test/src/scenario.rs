//! Scenario helpers
//!
//! One `TestDevice` is a fully assembled node over simulated emitters
//! with test-speed timings, plus the emitter handles for assertions.

use std::sync::Arc;
use std::time::Duration;

use faro_channel::ChannelConfig;
use faro_core::{GeoPoint, Identity};
use faro_effects::sim::SimEmitters;
use faro_runtime::{Collaborators, FaroNode, NodeConfig};
use faro_sender::{SenderConfig, StaticProviders};
use faro_state::NoopBridge;
use faro_transport::Connector;

/// Node tuning fast enough for tests: 50ms reconnects, 5ms graces.
pub fn fast_config() -> NodeConfig {
    NodeConfig {
        channel: ChannelConfig {
            reconnect_delay: Duration::from_millis(50),
            ..ChannelConfig::default()
        },
        sender: SenderConfig {
            location_timeout: Duration::from_millis(200),
            register_grace: Duration::from_millis(5),
            delivery_grace: Duration::from_millis(5),
        },
        ..NodeConfig::default()
    }
}

/// One assembled device plus its simulated emitters.
pub struct TestDevice {
    pub node: FaroNode,
    pub sim: SimEmitters,
}

impl TestDevice {
    /// Build a device with a location fix and a paired emergency contact.
    pub fn new(alias: &str, handle: &str, contact: &str, connector: Arc<dyn Connector>) -> Self {
        Self::with_emitters(alias, handle, contact, connector, SimEmitters::new())
    }

    pub fn with_emitters(
        alias: &str,
        handle: &str,
        contact: &str,
        connector: Arc<dyn Connector>,
        sim: SimEmitters,
    ) -> Self {
        let providers = Arc::new(
            StaticProviders::new(Identity::new(alias, handle), contact)
                .with_location(Some(GeoPoint::new(-12.0464, -77.0428))),
        );
        let node = FaroNode::new(
            Identity::new(alias, handle),
            connector,
            Collaborators {
                emitters: sim.set(),
                identity_provider: providers.clone(),
                location_provider: providers,
                bridge: Arc::new(NoopBridge),
            },
            fast_config(),
        );
        TestDevice { node, sim }
    }
}
