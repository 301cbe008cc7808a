//! Protocol timing constants and wall-clock helpers
//!
//! These are the reference defaults; every component takes them through a
//! config struct so tests can shrink them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Delay before a single reconnect attempt after a session failure.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Interval between outbound keepalive pings on an open session.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// No inbound activity for this long means the session is half-open.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Bounded wait for a transport connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Torch strobe on/off phase. Also the bound on alarm stop latency.
pub const STROBE_PHASE: Duration = Duration::from_millis(250);

/// Banner color toggle period, independent of the strobe.
pub const BANNER_PERIOD: Duration = Duration::from_millis(600);

/// Vibration waveform on/off phase.
pub const VIBRATION_PHASE: Duration = Duration::from_millis(400);

/// Bounded wait for a location fix before aborting a distress send.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace after the register frame so the relay can bind the handle.
pub const REGISTER_GRACE: Duration = Duration::from_millis(500);

/// Grace before closing a transient session so the payload drains.
pub const DELIVERY_GRACE: Duration = Duration::from_secs(1);

/// Current wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
