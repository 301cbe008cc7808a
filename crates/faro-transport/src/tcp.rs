//! TCP transport: newline-delimited UTF-8 frames
//!
//! One connected stream becomes two spawned tasks: a reader that feeds
//! inbound lines to the session's `FrameSource`, and a writer that drains
//! the `FrameSink`. IO errors and EOF close the source, which the channel
//! observes as transport failure.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use faro_core::{FaroError, FaroResult, CONNECT_TIMEOUT};

use crate::{ConnectFuture, Connector, FrameSink, FrameSource, TransportSession, FRAME_BUFFER};

/// Dials a fixed relay address over TCP.
pub struct TcpConnector {
    addr: SocketAddr,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(addr: SocketAddr) -> Self {
        TcpConnector {
            addr,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(addr: SocketAddr, connect_timeout: Duration) -> Self {
        TcpConnector {
            addr,
            connect_timeout,
        }
    }

    async fn dial(addr: SocketAddr, timeout: Duration) -> FaroResult<TransportSession> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| FaroError::Transport(format!("connect to {addr} timed out")))?
            .map_err(|e| FaroError::Transport(e.to_string()))?;

        Ok(spawn_line_session(stream))
    }
}

impl Connector for TcpConnector {
    fn connect(&self) -> ConnectFuture {
        let addr = self.addr;
        let timeout = self.connect_timeout;
        Box::pin(Self::dial(addr, timeout))
    }
}

/// Wrap an already-connected stream into a framed session.
pub fn spawn_line_session(stream: TcpStream) -> TransportSession {
    let (read_half, mut write_half) = stream.into_split();

    let (in_tx, in_rx) = mpsc::channel::<String>(FRAME_BUFFER);
    let (out_tx, mut out_rx) = mpsc::channel::<String>(FRAME_BUFFER);

    // Reader: one frame per line until EOF or error.
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if in_tx.send(line).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::warn!("tcp read error: {}", e);
                    break;
                }
            }
        }
    });

    // Writer: drains the sink until all clones drop, then sends FIN.
    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let mut line = frame.into_bytes();
            line.push(b'\n');
            if let Err(e) = write_half.write_all(&line).await {
                tracing::warn!("tcp write error: {}", e);
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    TransportSession::new(FrameSink::new(out_tx), FrameSource::new(in_rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_line_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            spawn_line_session(stream)
        });

        let connector = TcpConnector::new(addr);
        let client = connector.connect().await.unwrap();
        let mut server = accept.await.unwrap();

        client.sink.send(r#"{"estado":"SOS"}"#.into()).await.unwrap();
        assert_eq!(
            server.source.next().await.as_deref(),
            Some(r#"{"estado":"SOS"}"#)
        );

        server.sink.send(r#"{"tipo":"clear"}"#.into()).await.unwrap();
        let mut client_source = client.source;
        assert_eq!(
            client_source.next().await.as_deref(),
            Some(r#"{"tipo":"clear"}"#)
        );
    }

    #[tokio::test]
    async fn test_peer_close_ends_source() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            spawn_line_session(stream)
        });

        let client = TcpConnector::new(addr).connect().await.unwrap();
        let server = accept.await.unwrap();

        drop(server);
        let mut source = client.source;
        assert_eq!(source.next().await, None);
    }

    #[tokio::test]
    async fn test_connect_refused_is_transport_error() {
        // Bind then drop to get an address nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = TcpConnector::with_timeout(addr, Duration::from_secs(1))
            .connect()
            .await;
        assert!(matches!(result, Err(FaroError::Transport(_))));
    }
}
