//! TCP listener and framed connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parlor_protocol::{Frame, FrameHeader};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::{ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP listener that accepts framed connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener =
            TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for and accepts the next incoming connection.
    pub async fn accept(&mut self) -> Result<FrameConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted connection");

        Ok(FrameConnection { id, peer, stream })
    }
}

/// A single duplex byte stream carrying whole frames.
///
/// Exclusively owned by whichever component currently drives the
/// protocol for this peer — all methods take `&mut self` and there is
/// exactly one outstanding receive at a time.
pub struct FrameConnection {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
}

impl FrameConnection {
    /// Connects to a remote server (client side).
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::Connect)?;
        let peer = stream.peer_addr().map_err(TransportError::Connect)?;
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "connected");
        Ok(Self { id, peer, stream })
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the peer's socket address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Encodes and sends one frame.
    ///
    /// Delivery is best-effort from the protocol's point of view:
    /// broadcast senders ignore the result, while handshake and abort
    /// paths check it.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let bytes = frame.encode();
        self.stream
            .write_all(&bytes)
            .await
            .map_err(TransportError::Send)
    }

    /// Receives one whole frame (header plus exactly the declared
    /// payload bytes) within `deadline`.
    ///
    /// The payload is always read to its declared length even when
    /// the type tag is unknown, so a protocol-violating frame leaves
    /// the stream in sync for the next one. Interpreting the payload
    /// is the caller's job (via [`Frame::decode`]).
    pub async fn recv_frame(
        &mut self,
        deadline: Duration,
    ) -> Result<(FrameHeader, Vec<u8>), TransportError> {
        tokio::time::timeout(deadline, self.recv_frame_inner())
            .await
            .map_err(|_| TransportError::Timeout(deadline))?
    }

    async fn recv_frame_inner(&mut self) -> Result<(FrameHeader, Vec<u8>), TransportError> {
        let mut header_bytes = [0u8; FrameHeader::SIZE];
        read_exact(&mut self.stream, &mut header_bytes).await?;
        let header = FrameHeader::from_bytes(&header_bytes)?;

        // The header's length field is validated against MAX_PAYLOAD_LEN,
        // so this allocation is bounded.
        let mut payload = vec![0u8; header.payload_len() as usize];
        read_exact(&mut self.stream, &mut payload).await?;

        Ok((header, payload))
    }
}

async fn read_exact(
    stream: &mut TcpStream,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    stream.read_exact(buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            TransportError::Closed
        } else {
            TransportError::Recv(e)
        }
    })?;
    Ok(())
}
