//! Socket construction for control and data channels.

use std::io;
use std::net::{SocketAddr, TcpListener, UdpSocket};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

const LISTEN_BACKLOG: i32 = 3;

/// Opens the sockets for one listening address.
#[cfg_attr(test, mockall::automock)]
pub trait SocketFactory {
    /// Opens a non-blocking TCP listener bound to `addr`.
    fn open_tcp(&self, addr: SocketAddr) -> io::Result<TcpListener>;

    /// Opens a non-blocking UDP socket bound to `addr`.
    fn open_udp(&self, addr: SocketAddr) -> io::Result<UdpSocket>;
}

/// Socket factory using the operating system's sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSocketFactory;

impl SocketFactory for SystemSocketFactory {
    fn open_tcp(&self, addr: SocketAddr) -> io::Result<TcpListener> {
        let socket = new_socket(addr, Type::STREAM, Protocol::TCP)?;
        socket.set_reuse_address(true)?;
        socket.bind(&SockAddr::from(addr))?;
        socket.listen(LISTEN_BACKLOG)?;
        Ok(socket.into())
    }

    fn open_udp(&self, addr: SocketAddr) -> io::Result<UdpSocket> {
        let socket = new_socket(addr, Type::DGRAM, Protocol::UDP)?;
        socket.bind(&SockAddr::from(addr))?;
        Ok(socket.into())
    }
}

fn new_socket(addr: SocketAddr, kind: Type, protocol: Protocol) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), kind, Some(protocol))?;
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_nonblocking(true)?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_and_udp_share_a_port() {
        let factory = SystemSocketFactory;
        let tcp = factory
            .open_tcp(SocketAddr::from(([127, 0, 0, 1], 0)))
            .expect("tcp listener");
        let addr = tcp.local_addr().expect("local addr");
        let udp = factory.open_udp(addr).expect("udp socket");
        assert_eq!(udp.local_addr().expect("local addr"), addr);
    }

    #[test]
    fn sockets_are_non_blocking() {
        let tcp = SystemSocketFactory
            .open_tcp(SocketAddr::from(([127, 0, 0, 1], 0)))
            .expect("tcp listener");
        let error = tcp.accept().expect_err("no pending connection");
        assert_eq!(error.kind(), io::ErrorKind::WouldBlock);
    }
}
