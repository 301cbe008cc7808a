//! FARO Transport Layer - framed text transports
//!
//! This crate provides:
//! - The `Connector` seam the channel and sender dial through
//! - TCP transport (newline-delimited UTF-8 frames)
//! - In-memory relay hub for tests and local wiring

pub mod session;
pub mod tcp;
pub mod memory;

pub use session::*;
pub use tcp::TcpConnector;
pub use memory::{MemoryConnector, MemoryRelay};
