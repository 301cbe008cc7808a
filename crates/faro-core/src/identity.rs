//! Identity and location types
//!
//! Aliases and contact handles are opaque strings supplied by the caller.
//! The core never validates their format, only non-emptiness where a frame
//! needs a routing handle.

use std::fmt;

/// Who this device is on the relay: a display alias plus the handle the
/// relay routes frames by.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Identity {
    alias: String,
    contact_handle: String,
}

impl Identity {
    pub fn new(alias: impl Into<String>, contact_handle: impl Into<String>) -> Self {
        Identity {
            alias: alias.into(),
            contact_handle: contact_handle.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn contact_handle(&self) -> &str {
        &self.contact_handle
    }

    /// A frame can only be routed when the handle is non-empty.
    pub fn has_route(&self) -> bool {
        !self.contact_handle.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.alias, self.contact_handle)
    }
}

/// Opaque device coordinates. The core consumes these, it never produces
/// them (location acquisition is a collaborator concern).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}
