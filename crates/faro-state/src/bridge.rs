//! Notification bridge boundary
//!
//! The bridge is an external collaborator: it receives every alarm-state
//! transition and is responsible for any OS-level banner outside the
//! running process. Fire-and-forget, it must never block the arbiter.

use parking_lot::Mutex;

use faro_core::AlarmState;

pub trait NotificationBridge: Send + Sync {
    fn alarm_state_changed(&self, alias: &str, state: AlarmState, lat: f64, lon: f64);
}

/// Bridge for hosts without an OS notification surface.
pub struct NoopBridge;

impl NotificationBridge for NoopBridge {
    fn alarm_state_changed(&self, _alias: &str, _state: AlarmState, _lat: f64, _lon: f64) {}
}

/// Bridge that records transitions, for tests.
#[derive(Default)]
pub struct RecordingBridge {
    notifications: Mutex<Vec<(String, AlarmState, f64, f64)>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, AlarmState, f64, f64)> {
        self.notifications.lock().clone()
    }
}

impl NotificationBridge for RecordingBridge {
    fn alarm_state_changed(&self, alias: &str, state: AlarmState, lat: f64, lon: f64) {
        self.notifications
            .lock()
            .push((alias.to_string(), state, lat, lon));
    }
}
