//! Lossy connector wrapper
//!
//! Wraps any `Connector` and applies seeded loss and duplication to the
//! inbound frame stream, simulating a relay link that misbehaves. The
//! outbound half passes through untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use faro_transport::{
    ConnectFuture, Connector, FrameSource, TransportSession, FRAME_BUFFER,
};

/// Inbound misbehavior rates, 0.0 - 1.0.
#[derive(Clone, Copy, Debug)]
pub struct LossConfig {
    pub drop_rate: f64,
    pub duplicate_rate: f64,
    pub seed: u64,
}

impl Default for LossConfig {
    fn default() -> Self {
        LossConfig {
            drop_rate: 0.0,
            duplicate_rate: 0.0,
            seed: 42,
        }
    }
}

impl LossConfig {
    /// Drop everything.
    pub fn black_hole() -> Self {
        LossConfig {
            drop_rate: 1.0,
            ..Self::default()
        }
    }

    /// Deliver every frame twice.
    pub fn duplicating() -> Self {
        LossConfig {
            duplicate_rate: 1.0,
            ..Self::default()
        }
    }
}

/// A connector whose inbound stream loses or duplicates frames.
pub struct LossyConnector {
    inner: Arc<dyn Connector>,
    config: LossConfig,
    rng: Arc<Mutex<StdRng>>,
}

impl LossyConnector {
    pub fn new(inner: Arc<dyn Connector>, config: LossConfig) -> Self {
        let rng = Arc::new(Mutex::new(StdRng::seed_from_u64(config.seed)));
        LossyConnector { inner, config, rng }
    }
}

impl Connector for LossyConnector {
    fn connect(&self) -> ConnectFuture {
        let inner = self.inner.connect();
        let config = self.config;
        let rng = Arc::clone(&self.rng);

        Box::pin(async move {
            let session = inner.await?;
            let (sink, mut source) = session.split();
            let (in_tx, in_rx) = mpsc::channel(FRAME_BUFFER);

            tokio::spawn(async move {
                while let Some(frame) = source.next().await {
                    let (dropped, duplicated) = {
                        let mut rng = rng.lock();
                        (
                            rng.gen::<f64>() < config.drop_rate,
                            rng.gen::<f64>() < config.duplicate_rate,
                        )
                    };
                    if dropped {
                        continue;
                    }
                    if in_tx.send(frame.clone()).await.is_err() {
                        break;
                    }
                    if duplicated && in_tx.send(frame).await.is_err() {
                        break;
                    }
                }
            });

            Ok(TransportSession::new(sink, FrameSource::new(in_rx)))
        })
    }
}
