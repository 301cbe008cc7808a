//! FARO Test Harness - hostile relay simulation
//!
//! This crate provides:
//! - A lossy connector wrapper (seeded drop/duplicate on inbound frames)
//! - Node-building helpers shared by the end-to-end scenarios

pub mod lossy;
pub mod scenario;

pub use lossy::*;
pub use scenario::*;
