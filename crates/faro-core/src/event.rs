//! Distress events
//!
//! A `DistressEvent` is the one state-carrying message of the protocol:
//! SOS arms the receiving device, CLEAR disarms it, PING probes liveness.
//! Events are immutable once constructed and consumed by exactly one
//! arbiter transition.

use crate::{now_ms, GeoPoint};

/// What an event means for the receiving device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DistressKind {
    /// Begin alarm.
    Sos,
    /// End alarm.
    Clear,
    /// Liveness probe, never changes alarm state.
    Ping,
}

/// One distress message, inbound or outbound.
#[derive(Clone, PartialEq, Debug)]
pub struct DistressEvent {
    pub kind: DistressKind,
    pub alias: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamp_ms: i64,
}

impl DistressEvent {
    pub fn new(
        kind: DistressKind,
        alias: impl Into<String>,
        lat: f64,
        lon: f64,
        timestamp_ms: i64,
    ) -> Self {
        DistressEvent {
            kind,
            alias: alias.into(),
            lat,
            lon,
            timestamp_ms,
        }
    }

    /// An SOS stamped with the current wall clock.
    pub fn sos(alias: impl Into<String>, location: GeoPoint) -> Self {
        Self::new(DistressKind::Sos, alias, location.lat, location.lon, now_ms())
    }

    /// A CLEAR stamped with the current wall clock.
    pub fn clear(alias: impl Into<String>) -> Self {
        Self::new(DistressKind::Clear, alias, 0.0, 0.0, now_ms())
    }

    /// A liveness probe.
    pub fn ping(alias: impl Into<String>) -> Self {
        Self::new(DistressKind::Ping, alias, 0.0, 0.0, now_ms())
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Whether this event can change alarm state at all.
    pub fn is_state_affecting(&self) -> bool {
        !matches!(self.kind, DistressKind::Ping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sos_carries_location() {
        let ev = DistressEvent::sos("Ana", GeoPoint::new(-12.05, -77.04));
        assert_eq!(ev.kind, DistressKind::Sos);
        assert_eq!(ev.location(), GeoPoint::new(-12.05, -77.04));
        assert!(ev.timestamp_ms > 0);
    }

    #[test]
    fn test_ping_is_not_state_affecting() {
        assert!(!DistressEvent::ping("Ana").is_state_affecting());
        assert!(DistressEvent::clear("Ana").is_state_affecting());
    }
}
