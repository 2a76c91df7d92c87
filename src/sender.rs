//! Datagram transport to the collector
//!
//! One rendered message becomes one UDP datagram. There is no framing,
//! acknowledgement or retry; a failed send is reported to the caller,
//! which drops the message.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time;
use tracing::debug;

use crate::error::{MapError, NetworkError, Result};

/// Resolve the collector once, preferring IPv4 results.
pub async fn resolve_collector(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| NetworkError::AddressResolution(format!("{}:{}: {}", host, port, e)))?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| NetworkError::AddressResolution(format!("{}:{}: no addresses", host, port)).into())
}

/// Owns the outbound socket for one run
pub struct UdpSender {
    socket: UdpSocket,
    collector: SocketAddr,
    send_timeout: Duration,
}

impl UdpSender {
    /// Bind an ephemeral local socket of the collector's address family.
    pub async fn bind(collector: SocketAddr, send_timeout: Duration) -> Result<Self> {
        let local: SocketAddr = if collector.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| NetworkError::SocketBind(format!("{}: {}", local, e)))?;

        debug!("Bound {} for collector {}", socket.local_addr()?, collector);

        Ok(Self {
            socket,
            collector,
            send_timeout,
        })
    }

    /// Send one message as a single datagram; returns the bytes written.
    pub async fn send(&self, message: &str) -> Result<usize> {
        let payload = message.as_bytes();

        match time::timeout(self.send_timeout, self.socket.send_to(payload, self.collector)).await {
            Ok(result) => result.map_network_error(&format!("send_to {}", self.collector)),
            Err(_) => Err(NetworkError::SendTimeout(self.send_timeout.as_millis() as u64).into()),
        }
    }

    pub fn collector(&self) -> SocketAddr {
        self.collector
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Release the socket.
    pub fn close(self) {
        debug!("Releasing transport socket for collector {}", self.collector);
        drop(self.socket);
    }
}
