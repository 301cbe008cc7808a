//! In-memory relay hub
//!
//! Process-local stand-in for the real relay: every connected endpoint's
//! frames fan out to all other endpoints. Used by channel and sender tests
//! and by multi-node scenarios. The hub can be marked down (connects fail)
//! or have all live links severed (simulated relay restart).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use faro_core::FaroError;

use crate::{ConnectFuture, Connector, FrameSink, FrameSource, TransportSession, FRAME_BUFFER};

struct RelayInner {
    endpoints: Mutex<HashMap<u64, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    down: AtomicBool,
    connects: AtomicUsize,
}

/// The hub. Clone-cheap handle; `connector()` hands out dialers.
#[derive(Clone)]
pub struct MemoryRelay {
    inner: Arc<RelayInner>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        MemoryRelay {
            inner: Arc::new(RelayInner {
                endpoints: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                down: AtomicBool::new(false),
                connects: AtomicUsize::new(0),
            }),
        }
    }

    /// A connector dialing this hub.
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            inner: Arc::clone(&self.inner),
        }
    }

    /// While down, every connect attempt fails with a transport error.
    pub fn set_down(&self, down: bool) {
        self.inner.down.store(down, Ordering::SeqCst);
    }

    /// Sever all live endpoints. Their sources end, as after a relay crash.
    pub fn disconnect_all(&self) {
        self.inner.endpoints.lock().clear();
    }

    pub fn endpoint_count(&self) -> usize {
        self.inner.endpoints.lock().len()
    }

    /// Total connect attempts, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// Dialer for one `MemoryRelay`.
#[derive(Clone)]
pub struct MemoryConnector {
    inner: Arc<RelayInner>,
}

impl Connector for MemoryConnector {
    fn connect(&self) -> ConnectFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.connects.fetch_add(1, Ordering::SeqCst);
            if inner.down.load(Ordering::SeqCst) {
                return Err(FaroError::Transport("relay unreachable".into()));
            }

            let id = inner.next_id.fetch_add(1, Ordering::SeqCst);
            let (in_tx, in_rx) = mpsc::channel::<String>(FRAME_BUFFER);
            let (out_tx, mut out_rx) = mpsc::channel::<String>(FRAME_BUFFER);

            inner.endpoints.lock().insert(id, in_tx);

            // Fan-out task: every frame from this endpoint reaches all
            // other endpoints. Peer senders are snapshotted outside the
            // lock before any await.
            let fanout = Arc::clone(&inner);
            tokio::spawn(async move {
                while let Some(frame) = out_rx.recv().await {
                    let peers: Vec<_> = fanout
                        .endpoints
                        .lock()
                        .iter()
                        .filter(|(peer_id, _)| **peer_id != id)
                        .map(|(_, tx)| tx.clone())
                        .collect();
                    for tx in peers {
                        let _ = tx.send(frame.clone()).await;
                    }
                }
                fanout.endpoints.lock().remove(&id);
            });

            Ok(TransportSession::new(
                FrameSink::new(out_tx),
                FrameSource::new(in_rx),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_excludes_sender() {
        let relay = MemoryRelay::new();
        let a = relay.connector().connect().await.unwrap();
        let mut b = relay.connector().connect().await.unwrap();
        let mut c = relay.connector().connect().await.unwrap();

        a.sink.send("sos".into()).await.unwrap();
        assert_eq!(b.source.next().await.as_deref(), Some("sos"));
        assert_eq!(c.source.next().await.as_deref(), Some("sos"));
        assert_eq!(relay.endpoint_count(), 3);
    }

    #[tokio::test]
    async fn test_down_relay_rejects_connects() {
        let relay = MemoryRelay::new();
        relay.set_down(true);
        assert!(relay.connector().connect().await.is_err());
        assert_eq!(relay.connect_attempts(), 1);

        relay.set_down(false);
        assert!(relay.connector().connect().await.is_ok());
        assert_eq!(relay.connect_attempts(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_all_ends_sources() {
        let relay = MemoryRelay::new();
        let session = relay.connector().connect().await.unwrap();
        let (_sink, mut source) = session.split();

        relay.disconnect_all();
        assert_eq!(source.next().await, None);
    }
}
