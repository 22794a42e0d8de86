//! TCP acceptor adapter.
//!
//! Wraps `std::net::TcpListener`, which is available both on the host and on
//! ESP-IDF (lwIP sockets behind the std shim). Every accepted stream gets
//! read and write timeouts so a silent client cannot wedge the server.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use log::{debug, info};

use crate::app::ports::{Acceptor, Connection, Peer};
use crate::error::TransportError;

pub struct TcpAcceptor {
    listener: TcpListener,
    io_timeout: Duration,
}

impl TcpAcceptor {
    /// Bind on all interfaces.
    pub fn bind(port: u16, io_timeout_ms: u32) -> std::io::Result<Self> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)), io_timeout_ms)
    }

    pub fn bind_addr(addr: SocketAddr, io_timeout_ms: u32) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("SERVER | listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            io_timeout: Duration::from_millis(u64::from(io_timeout_ms.max(1))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Acceptor for TcpAcceptor {
    type Conn = TcpConnection;

    fn accept(&mut self) -> Result<TcpConnection, TransportError> {
        let (stream, addr) = self.listener.accept().map_err(|e| {
            debug!("SERVER | accept: {}", e);
            TransportError::AcceptFailed
        })?;
        // A stream without timeouts could block forever; refuse it.
        stream
            .set_read_timeout(Some(self.io_timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.io_timeout)))
            .map_err(|_| TransportError::AcceptFailed)?;
        Ok(TcpConnection {
            stream,
            peer: Peer::Addr(addr),
        })
    }
}

pub struct TcpConnection {
    stream: TcpStream,
    peer: Peer,
}

impl Connection for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.stream
            .read(buf)
            .map_err(|e| TransportError::from_read(&e))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data).map_err(|e| match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                TransportError::Timeout
            }
            std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => TransportError::Closed,
            _ => TransportError::WriteFailed,
        })?;
        self.stream.flush().map_err(|_| TransportError::WriteFailed)
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    fn peer(&self) -> Peer {
        self.peer
    }
}
