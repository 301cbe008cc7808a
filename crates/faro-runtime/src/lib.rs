//! FARO Runtime - host-context assembly
//!
//! This crate provides:
//! - `FaroNode`: dependency-injected wiring of channel, arbiter, effects,
//!   and sender, with a single order-preserving event pump
//! - Tracing initialization for hosts

pub mod node;

pub use node::*;

/// Install the workspace's logging layer: an env-filtered fmt subscriber.
/// `RUST_LOG` selects levels; defaults to `info`. Safe to call once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
