//! FARO Channel - the long-lived relay connection
//!
//! This crate provides:
//! - Session lifecycle (connecting, open, closing, closed)
//! - Per-session registration
//! - Read loop with malformed-frame drops
//! - Keepalive pings and an idle watchdog
//! - Single-supervisor fixed-delay reconnect
//! - Total, idempotent `close()`

pub mod channel;
pub mod session;

pub use channel::*;
pub use session::*;
