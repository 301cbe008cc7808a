//! Transport session halves and the connector seam
//!
//! A connected transport is a pair of halves backed by spawned IO tasks:
//! `FrameSink` carries outbound frames, `FrameSource` yields inbound ones.
//! Dropping both halves releases the underlying transport.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use faro_core::{FaroError, FaroResult};

/// Boxed connect future, keeps the `Connector` seam object-safe.
pub type ConnectFuture = Pin<Box<dyn Future<Output = FaroResult<TransportSession>> + Send>>;

/// Anything that can dial the relay and produce a live session.
pub trait Connector: Send + Sync {
    fn connect(&self) -> ConnectFuture;
}

/// One live transport, as a pair of framed halves.
pub struct TransportSession {
    pub sink: FrameSink,
    pub source: FrameSource,
}

impl TransportSession {
    pub fn new(sink: FrameSink, source: FrameSource) -> Self {
        TransportSession { sink, source }
    }

    pub fn split(self) -> (FrameSink, FrameSource) {
        (self.sink, self.source)
    }
}

/// Outbound half. Cloneable; all clones feed the same writer task.
#[derive(Clone)]
pub struct FrameSink {
    tx: mpsc::Sender<String>,
}

impl FrameSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        FrameSink { tx }
    }

    /// Queue one frame for transmission. Errors once the transport is gone.
    pub async fn send(&self, frame: String) -> FaroResult<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| FaroError::Transport("transport closed".into()))
    }
}

/// Inbound half, single consumer.
pub struct FrameSource {
    rx: mpsc::Receiver<String>,
}

impl FrameSource {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        FrameSource { rx }
    }

    /// Next inbound frame; `None` means the transport closed or failed.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Buffer depth for the frame channels behind each session half.
pub const FRAME_BUFFER: usize = 64;

/// Build a connected pair of in-process sessions, each half wired straight
/// to the peer. Handy for unit tests below the relay level.
pub fn session_pair() -> (TransportSession, TransportSession) {
    let (a_tx, b_rx) = mpsc::channel(FRAME_BUFFER);
    let (b_tx, a_rx) = mpsc::channel(FRAME_BUFFER);
    (
        TransportSession::new(FrameSink::new(a_tx), FrameSource::new(a_rx)),
        TransportSession::new(FrameSink::new(b_tx), FrameSource::new(b_rx)),
    )
}
