//! Datagram transport used by the handshake and the session.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::TransportError;

/// Connected datagram transport.
///
/// `recv` blocks until one datagram arrives or the transport's timeout
/// elapses, returning at most `max_len` bytes.
pub trait Transport {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError>;

    fn recv(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        (**self).send(datagram)
    }

    fn recv(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).recv(max_len)
    }
}

/// UDP socket connected to a single server.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds an ephemeral local port and connects it to `remote`.
    ///
    /// `None`, or a zero duration, blocks on receive forever.
    pub fn connect(remote: SocketAddr, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let local: SocketAddr = if remote.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(remote)?;
        socket.set_read_timeout(timeout.filter(|t| !t.is_zero()))?;
        Ok(Self { socket })
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Server address the socket is connected to.
    pub fn peer_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.peer_addr()?)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        self.socket.send(datagram)?;
        Ok(())
    }

    fn recv(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0; max_len];
        match self.socket.recv(&mut buf) {
            Ok(len) => {
                buf.truncate(len);
                Ok(buf)
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(TransportError::Timeout)
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}
