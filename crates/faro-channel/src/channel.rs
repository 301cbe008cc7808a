//! The realtime channel
//!
//! A single supervisor task owns the connection for the channel's whole
//! life: connect, register, pump inbound frames, and on failure wait one
//! fixed delay before the next attempt. Because the supervisor is one
//! loop, at most one reconnect is ever pending. `close()` cancels the
//! supervisor and joins it, so no event is delivered after it returns.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use faro_core::{
    DistressEvent, FaroError, FaroResult, Identity, SessionState, IDLE_TIMEOUT, PING_INTERVAL,
    RECONNECT_DELAY,
};
use faro_transport::{Connector, FrameSink, FrameSource};
use faro_wire::{decode_frame, encode_distress, encode_register, InboundFrame};

use crate::ChannelSession;

/// Channel tuning. Defaults are the reference behavior; tests shrink them.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Fixed delay before the single scheduled reconnect attempt.
    pub reconnect_delay: std::time::Duration,
    /// Keepalive ping cadence on an open session.
    pub ping_interval: std::time::Duration,
    /// Inbound silence treated as a half-open connection.
    pub idle_timeout: std::time::Duration,
    /// Inbound event buffer depth.
    pub event_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            reconnect_delay: RECONNECT_DELAY,
            ping_interval: PING_INTERVAL,
            idle_timeout: IDLE_TIMEOUT,
            event_buffer: 64,
        }
    }
}

struct Shared {
    identity: Identity,
    connector: Arc<dyn Connector>,
    config: ChannelConfig,
    session: parking_lot::Mutex<ChannelSession>,
}

/// Why one session ended.
enum SessionEnd {
    /// Transport failed or went half-open; reconnect.
    Transport,
    /// `close()` was called; stop entirely.
    Cancelled,
    /// The event consumer dropped its receiver; stop entirely.
    ConsumerGone,
}

/// The long-lived receiving connection to the relay.
pub struct RealtimeChannel {
    shared: Arc<Shared>,
    cancel_tx: watch::Sender<bool>,
    supervisor: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeChannel {
    pub fn new(identity: Identity, connector: Arc<dyn Connector>, config: ChannelConfig) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        RealtimeChannel {
            shared: Arc::new(Shared {
                identity,
                connector,
                config,
                session: parking_lot::Mutex::new(ChannelSession::new()),
            }),
            cancel_tx,
            supervisor: parking_lot::Mutex::new(None),
        }
    }

    /// Spawn the connection supervisor and return the inbound event
    /// stream. Connection failures never surface here; the channel is
    /// always-eventually-connected until `close()`.
    pub fn connect(&self) -> mpsc::Receiver<DistressEvent> {
        let (events_tx, events_rx) = mpsc::channel(self.shared.config.event_buffer);

        let mut slot = self.supervisor.lock();
        if slot.is_some() {
            warn!("channel already connected, ignoring second connect");
            return events_rx;
        }

        let shared = Arc::clone(&self.shared);
        let cancel_rx = self.cancel_tx.subscribe();
        *slot = Some(tokio::spawn(supervise(shared, events_tx, cancel_rx)));
        events_rx
    }

    /// Send one event on the current session.
    ///
    /// Rejected with `NotConnected` when no session is open; the channel
    /// never buffers outbound frames across reconnects.
    pub async fn send(&self, event: &DistressEvent) -> FaroResult<()> {
        let sink = self
            .shared
            .session
            .lock()
            .sink()
            .ok_or(FaroError::NotConnected)?;
        // The long-lived channel routes by its registered handle; the
        // contact field is only meaningful on the sender path.
        let frame = encode_distress(&self.shared.identity, "", event)?;
        sink.send(frame).await
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        self.shared.session.lock().state()
    }

    /// Identity registered on the current session, if registration ran.
    pub fn registered_identity(&self) -> Option<Identity> {
        self.shared.session.lock().registered_identity().cloned()
    }

    /// Total teardown. Cancels any in-flight connect or pending reconnect,
    /// closes the transport, and joins the supervisor: after this returns
    /// no further event is delivered. Safe to call repeatedly.
    pub async fn close(&self) {
        self.shared.session.lock().closing();
        let _ = self.cancel_tx.send(true);

        let handle = self.supervisor.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.shared.session.lock().closed();
    }
}

async fn supervise(
    shared: Arc<Shared>,
    events_tx: mpsc::Sender<DistressEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        if *cancel.borrow() {
            break;
        }

        shared.session.lock().connecting();
        let attempt = tokio::select! {
            result = shared.connector.connect() => Some(result),
            _ = cancel.changed() => None,
        };
        let Some(attempt) = attempt else { break };

        match attempt {
            Ok(transport) => {
                let (sink, source) = transport.split();
                shared.session.lock().opened(sink.clone());
                info!("session open, registering {}", shared.identity);

                let end = match register(&shared, &sink).await {
                    Ok(()) => run_session(&shared, &sink, source, &events_tx, &mut cancel).await,
                    Err(e) => {
                        warn!("registration failed, recycling session: {}", e);
                        SessionEnd::Transport
                    }
                };
                shared.session.lock().closed();

                match end {
                    SessionEnd::Transport => {}
                    SessionEnd::Cancelled => break,
                    SessionEnd::ConsumerGone => {
                        debug!("event consumer gone, stopping channel");
                        break;
                    }
                }
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                shared.session.lock().closed();
            }
        }

        // Exactly one reconnect attempt, after a fixed delay. The wait
        // observes the cancel signal so close() stays prompt.
        debug!("reconnecting in {:?}", shared.config.reconnect_delay);
        tokio::select! {
            _ = tokio::time::sleep(shared.config.reconnect_delay) => {}
            _ = cancel.changed() => break,
        }
    }

    shared.session.lock().closed();
}

/// Registration is per-session: sent once on every new open session.
async fn register(shared: &Shared, sink: &FrameSink) -> FaroResult<()> {
    let frame = encode_register(shared.identity.contact_handle())?;
    sink.send(frame).await?;
    shared
        .session
        .lock()
        .registered(shared.identity.clone());
    Ok(())
}

async fn run_session(
    shared: &Shared,
    sink: &FrameSink,
    mut source: FrameSource,
    events_tx: &mpsc::Sender<DistressEvent>,
    cancel: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let mut ping = tokio::time::interval(shared.config.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ping.tick().await; // first tick completes immediately

    loop {
        tokio::select! {
            frame = source.next() => match frame {
                Some(text) => {
                    shared.session.lock().touch();
                    match decode_frame(&text) {
                        Ok(InboundFrame::Event(event)) => {
                            tokio::select! {
                                sent = events_tx.send(event) => {
                                    if sent.is_err() {
                                        return SessionEnd::ConsumerGone;
                                    }
                                }
                                _ = cancel.changed() => return SessionEnd::Cancelled,
                            }
                        }
                        Ok(InboundFrame::Ignored) => {
                            debug!("ignoring unrecognized frame: {}", text);
                        }
                        Err(e) => {
                            warn!("dropping malformed frame: {}", e);
                        }
                    }
                }
                None => {
                    warn!("transport closed by peer or failure");
                    return SessionEnd::Transport;
                }
            },
            _ = ping.tick() => {
                if shared.session.lock().idle_for() > shared.config.idle_timeout {
                    warn!("no inbound activity past idle timeout, recycling session");
                    return SessionEnd::Transport;
                }
                let ping_event = DistressEvent::ping(shared.identity.alias());
                match encode_distress(&shared.identity, "", &ping_event) {
                    Ok(frame) => {
                        if sink.send(frame).await.is_err() {
                            return SessionEnd::Transport;
                        }
                    }
                    Err(e) => warn!("keepalive encode failed: {}", e),
                }
            }
            _ = cancel.changed() => return SessionEnd::Cancelled,
        }
    }
}
