//! BACnet/IP datalink over UDP

use crate::datalink::{DatalinkLayer, FrameAccessor, ReceivedFrame};
use crate::error::{BacnetError, BacnetResult};
use async_trait::async_trait;
use bacrpm_core::address::DEFAULT_BIP_PORT;
use bacrpm_core::BacnetAddress;
use bacrpm_encoding::bvlc::{self, BvlcFunction};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Maximum UDP payload size
pub const MAX_UDP_PAYLOAD_SIZE: usize = 65507;

/// BACnet/IP datalink settings
#[derive(Debug, Clone)]
pub struct BipSettings {
    /// Local interface address to bind, unspecified for all interfaces
    pub interface: Ipv4Addr,
    /// UDP port to bind and to broadcast to
    pub port: u16,
    /// Directed or limited broadcast address
    pub broadcast: Ipv4Addr,
    /// Send timeout, `None` to wait indefinitely
    pub timeout: Option<Duration>,
}

impl BipSettings {
    /// Create settings for the given port on all interfaces
    pub fn new(port: u16) -> Self {
        Self {
            interface: Ipv4Addr::UNSPECIFIED,
            port,
            broadcast: Ipv4Addr::BROADCAST,
            timeout: Some(Duration::from_secs(5)),
        }
    }

    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_broadcast(mut self, broadcast: Ipv4Addr) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for BipSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BIP_PORT)
    }
}

/// BACnet/IP datalink implementation
pub struct BipDatalink {
    socket: Option<Arc<UdpSocket>>,
    settings: BipSettings,
    closed: bool,
    local: Option<SocketAddrV4>,
    read_buffer: Vec<u8>,
}

impl BipDatalink {
    /// Create a new, unopened datalink
    pub fn new(settings: BipSettings) -> Self {
        Self {
            socket: None,
            settings,
            closed: true,
            local: None,
            read_buffer: vec![0u8; MAX_UDP_PAYLOAD_SIZE],
        }
    }

    /// Bound address, once open
    pub fn local_address(&self) -> Option<BacnetAddress> {
        self.local.map(BacnetAddress::from_socket_addr)
    }

    fn socket(&self) -> BacnetResult<&Arc<UdpSocket>> {
        self.socket.as_ref().ok_or_else(|| {
            BacnetError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "BACnet/IP socket not open",
            ))
        })
    }

    fn broadcast_target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.settings.broadcast, self.settings.port)
    }

    /// Turn a raw datagram into a frame, dropping anything not meant for us
    fn accept_datagram(&self, datagram: &[u8], from: SocketAddr) -> Option<ReceivedFrame> {
        let SocketAddr::V4(from) = from else {
            log::debug!("Ignoring datagram from non-IPv4 peer {}", from);
            return None;
        };
        if Some(from) == self.local && !self.settings.interface.is_unspecified() {
            return None;
        }

        let frame = match bvlc::decode(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Dropping datagram from {}: {}", from, e);
                return None;
            }
        };
        if frame.function == BvlcFunction::Result {
            log::debug!("BVLC result from {}", from);
            return None;
        }

        let origin = frame.origin.unwrap_or(from);
        Some(ReceivedFrame {
            source: BacnetAddress::from_socket_addr(origin),
            npdu: frame.npdu.to_vec(),
        })
    }
}

#[async_trait]
impl DatalinkLayer for BipDatalink {
    async fn open(&mut self) -> BacnetResult<()> {
        if !self.closed {
            return Err(BacnetError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Datalink has already been opened",
            )));
        }

        let bind = SocketAddrV4::new(self.settings.interface, self.settings.port);
        let socket = UdpSocket::bind(bind).await?;
        socket.set_broadcast(true)?;
        self.local = match socket.local_addr()? {
            SocketAddr::V4(addr) => Some(addr),
            SocketAddr::V6(_) => None,
        };
        log::info!("BACnet/IP datalink bound to {}", bind);

        self.socket = Some(Arc::new(socket));
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl FrameAccessor for BipDatalink {
    async fn send(&mut self, destination: &BacnetAddress, npdu: &[u8]) -> BacnetResult<()> {
        let (function, target) = if destination.is_local_broadcast() {
            (BvlcFunction::OriginalBroadcastNpdu, self.broadcast_target())
        } else {
            let target = destination.socket_addr().ok_or_else(|| {
                BacnetError::InvalidData(format!("Not a BACnet/IP address: {}", destination))
            })?;
            (BvlcFunction::OriginalUnicastNpdu, target)
        };
        let frame = bvlc::encode(function, npdu)?;
        let socket = self.socket()?;

        if let Some(timeout) = self.settings.timeout {
            tokio::time::timeout(timeout, socket.send_to(&frame, target))
                .await
                .map_err(|_| BacnetError::Timeout)??;
        } else {
            socket.send_to(&frame, target).await?;
        }
        log::trace!("Sent {} octets to {}", frame.len(), target);
        Ok(())
    }

    async fn receive(&mut self, wait: Duration) -> BacnetResult<Option<ReceivedFrame>> {
        let socket = Arc::clone(self.socket()?);
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            let received = tokio::time::timeout_at(deadline, socket.recv_from(&mut self.read_buffer)).await;
            let (len, from) = match received {
                Err(_) => return Ok(None),
                Ok(result) => result?,
            };
            if let Some(frame) = self.accept_datagram(&self.read_buffer[..len], from) {
                return Ok(Some(frame));
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> BacnetResult<()> {
        self.socket = None;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> BipSettings {
        BipSettings::new(0).with_interface(Ipv4Addr::LOCALHOST)
    }

    #[tokio::test]
    async fn test_bip_settings() {
        let settings = BipSettings::default();
        assert_eq!(settings.port, 47808);
        assert_eq!(settings.broadcast, Ipv4Addr::BROADCAST);
        assert!(settings.interface.is_unspecified());
        assert!(settings.timeout.is_some());
    }

    #[tokio::test]
    async fn test_unicast_exchange() {
        let mut a = BipDatalink::new(loopback());
        let mut b = BipDatalink::new(loopback());
        a.open().await.unwrap();
        b.open().await.unwrap();
        assert!(a.open().await.is_err());

        let b_address = b.local_address().unwrap();
        a.send(&b_address, &[0x01, 0x00, 0x10, 0x08]).await.unwrap();

        let frame = b.receive(Duration::from_secs(2)).await.unwrap().unwrap();
        assert_eq!(frame.npdu, vec![0x01, 0x00, 0x10, 0x08]);
        assert_eq!(frame.source, a.local_address().unwrap());
    }

    #[tokio::test]
    async fn test_read_buffer_reused_between_frames() {
        let mut a = BipDatalink::new(loopback());
        let mut b = BipDatalink::new(loopback());
        a.open().await.unwrap();
        b.open().await.unwrap();
        let b_address = b.local_address().unwrap();

        let long = vec![0x01, 0x00, 0x30, 0x01, 0x0E, 0x0C, 0x00, 0x00, 0x00, 0x05];
        a.send(&b_address, &long).await.unwrap();
        a.send(&b_address, &[0x01, 0x00, 0x10, 0x08]).await.unwrap();

        let first = b.receive(Duration::from_secs(2)).await.unwrap().unwrap();
        let second = b.receive(Duration::from_secs(2)).await.unwrap().unwrap();
        assert_eq!(first.npdu, long);
        assert_eq!(second.npdu, vec![0x01, 0x00, 0x10, 0x08]);
    }

    #[tokio::test]
    async fn test_receive_times_out_quietly() {
        let mut a = BipDatalink::new(loopback());
        a.open().await.unwrap();
        let frame = a.receive(Duration::from_millis(20)).await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_garbage_is_dropped() {
        let mut a = BipDatalink::new(loopback());
        a.open().await.unwrap();
        let target = match a.local_address().unwrap().socket_addr() {
            Some(addr) => addr,
            None => panic!("loopback address expected"),
        };
        let raw = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        raw.send_to(&[0xFF, 0x00], target).await.unwrap();
        assert!(a.receive(Duration::from_millis(100)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_datalink_cannot_send() {
        let mut a = BipDatalink::new(loopback());
        assert!(a.is_closed());
        assert!(a.send(&BacnetAddress::broadcast(), &[0x01, 0x00]).await.is_err());
        a.open().await.unwrap();
        a.close().await.unwrap();
        assert!(a.is_closed());
    }
}
