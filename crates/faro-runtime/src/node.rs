//! FARO Node - one receiving/sending device
//!
//! The node owns the long-lived channel, the arbiter, the effects engine,
//! and a distress sender, all built from injected collaborators; there
//! is no ambient global anywhere. One pump task moves inbound events from
//! the channel to the arbiter, preserving arrival order.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

use faro_channel::{ChannelConfig, RealtimeChannel};
use faro_core::{AlarmState, DistressEvent, FaroResult, Identity, SessionState};
use faro_effects::{AlarmEffectsEngine, EffectsConfig, EmitterSet};
use faro_sender::{DistressSender, IdentityProvider, LocationProvider, SenderConfig};
use faro_state::{DistressArbiter, NotificationBridge};
use faro_transport::Connector;

/// Per-subsystem tuning for one node.
#[derive(Clone, Debug, Default)]
pub struct NodeConfig {
    pub channel: ChannelConfig,
    pub effects: EffectsConfig,
    pub sender: SenderConfig,
}

/// Everything the host injects: hardware emitters, session context,
/// location acquisition, and the OS notification surface.
pub struct Collaborators {
    pub emitters: EmitterSet,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub location_provider: Arc<dyn LocationProvider>,
    pub bridge: Arc<dyn NotificationBridge>,
}

/// One assembled device.
pub struct FaroNode {
    channel: Arc<RealtimeChannel>,
    arbiter: Arc<Mutex<DistressArbiter>>,
    engine: Arc<AlarmEffectsEngine>,
    sender: DistressSender,
    states: watch::Receiver<AlarmState>,
    pump: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl FaroNode {
    pub fn new(
        identity: Identity,
        connector: Arc<dyn Connector>,
        collaborators: Collaborators,
        config: NodeConfig,
    ) -> Self {
        let engine = Arc::new(AlarmEffectsEngine::new(
            collaborators.emitters,
            config.effects,
        ));
        let arbiter = DistressArbiter::new(Arc::clone(&engine), collaborators.bridge);
        let states = arbiter.states();
        let channel = Arc::new(RealtimeChannel::new(
            identity,
            Arc::clone(&connector),
            config.channel,
        ));
        let sender = DistressSender::new(
            connector,
            collaborators.identity_provider,
            collaborators.location_provider,
            config.sender,
        );

        FaroNode {
            channel,
            arbiter: Arc::new(Mutex::new(arbiter)),
            engine,
            sender,
            states,
            pump: parking_lot::Mutex::new(None),
        }
    }

    /// Connect the channel and start the event pump. Inbound events reach
    /// the arbiter one at a time, in arrival order.
    pub fn start(&self) {
        let mut slot = self.pump.lock();
        if slot.is_some() {
            warn!("node already started");
            return;
        }

        let mut events = self.channel.connect();
        let arbiter = Arc::clone(&self.arbiter);
        *slot = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                arbiter.lock().await.handle_event(&event).await;
            }
        }));
    }

    /// Subscribe to alarm-state transitions (UI hook).
    pub fn alarm_states(&self) -> watch::Receiver<AlarmState> {
        self.states.clone()
    }

    /// Current alarm state.
    pub fn alarm_state(&self) -> AlarmState {
        *self.states.borrow()
    }

    /// Current channel session state.
    pub fn session_state(&self) -> SessionState {
        self.channel.session_state()
    }

    /// The effects engine, for hosts that surface per-modality status.
    pub fn engine(&self) -> &Arc<AlarmEffectsEngine> {
        &self.engine
    }

    /// Run one outbound distress report over a transient session.
    /// Completion of the returned future, success or failure, is the
    /// signal to release any foreground-visible indicator.
    pub async fn trigger_sos(&self) -> FaroResult<DistressEvent> {
        self.sender.send_distress().await
    }

    /// Local silence action.
    pub async fn silence(&self) {
        self.arbiter.lock().await.silence().await;
    }

    /// Total teardown: channel closed, pump joined, effects stopped.
    /// Idempotent; safe to call from any task.
    pub async fn shutdown(&self) {
        self.channel.close().await;

        let handle = self.pump.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        self.arbiter.lock().await.silence().await;
        // The silence above is a no-op unless alerting; make release
        // unconditional.
        self.engine.stop().await;
    }
}
