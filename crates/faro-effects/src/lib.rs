//! FARO Effects - the alarm effects engine
//!
//! This crate provides:
//! - Emitter trait seams (audio, vibration, torch, banner)
//! - The engine: atomic start/stop of one alarm session across all four
//! - Strobe and banner timer loops with bounded-latency cancellation
//! - Per-modality degradation policy
//! - Simulated emitters for tests and headless hosts

pub mod emitter;
pub mod config;
pub mod engine;
pub mod sim;

pub use emitter::*;
pub use config::*;
pub use engine::*;
