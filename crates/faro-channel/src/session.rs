//! Channel session bookkeeping
//!
//! One `ChannelSession` describes one physical connection attempt. The
//! channel owns exactly one; a reconnect closes the old session before a
//! new one exists, so two open sessions never coexist.

// tokio's Instant, so the idle watchdog honors paused test time.
use tokio::time::Instant;

use faro_core::{Identity, SessionState};
use faro_transport::FrameSink;

/// Live view of the channel's current connection attempt.
pub struct ChannelSession {
    state: SessionState,
    registered_identity: Option<Identity>,
    last_activity: Instant,
    sink: Option<FrameSink>,
}

impl ChannelSession {
    pub fn new() -> Self {
        ChannelSession {
            state: SessionState::Closed,
            registered_identity: None,
            last_activity: Instant::now(),
            sink: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn registered_identity(&self) -> Option<&Identity> {
        self.registered_identity.as_ref()
    }

    /// Inactivity duration, for the idle watchdog.
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_activity.elapsed()
    }

    /// Outbound half of the open session, if any.
    pub fn sink(&self) -> Option<FrameSink> {
        if self.state.is_open() {
            self.sink.clone()
        } else {
            None
        }
    }

    pub(crate) fn connecting(&mut self) {
        self.state = SessionState::Connecting;
        self.registered_identity = None;
        self.sink = None;
    }

    pub(crate) fn opened(&mut self, sink: FrameSink) {
        self.state = SessionState::Open;
        self.sink = Some(sink);
        self.last_activity = Instant::now();
    }

    /// Registration is per-session state; a new session starts unregistered.
    pub(crate) fn registered(&mut self, identity: Identity) {
        self.registered_identity = Some(identity);
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub(crate) fn closing(&mut self) {
        self.state = SessionState::Closing;
    }

    pub(crate) fn closed(&mut self) {
        self.state = SessionState::Closed;
        self.registered_identity = None;
        self.sink = None;
    }
}

impl Default for ChannelSession {
    fn default() -> Self {
        Self::new()
    }
}
