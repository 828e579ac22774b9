//! BACnet network addresses
//!
//! An address is the MAC of the next hop on the local datalink plus an
//! optional remote network number and station address behind a router.

use crate::error::{BacnetError, BacnetResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Network number meaning "the local network"
pub const LOCAL_NETWORK: u16 = 0;

/// Network number meaning "all networks"
pub const BROADCAST_NETWORK: u16 = 0xFFFF;

/// Longest MAC or station address carried in an address
pub const MAX_MAC_LEN: usize = 7;

/// Default UDP port of BACnet/IP
pub const DEFAULT_BIP_PORT: u16 = 0xBAC0;

static IPV4_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?::(\d{1,5}))?$").expect("valid regex")
});

static HEX_MAC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{1,2}(?::[0-9A-Fa-f]{1,2}){0,6}$").expect("valid regex"));

/// Network address of a BACnet station
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BacnetAddress {
    /// MAC of the station on the local datalink (or of the router towards it)
    pub mac: Vec<u8>,
    /// Remote network number, `LOCAL_NETWORK` when directly attached
    pub net: u16,
    /// Station address on the remote network
    pub adr: Vec<u8>,
}

impl BacnetAddress {
    /// Directly attached station
    pub fn local(mac: Vec<u8>) -> Self {
        Self {
            mac,
            net: LOCAL_NETWORK,
            adr: Vec::new(),
        }
    }

    /// Station behind a router
    pub fn remote(mac: Vec<u8>, net: u16, adr: Vec<u8>) -> Self {
        Self { mac, net, adr }
    }

    /// Global broadcast
    pub fn broadcast() -> Self {
        Self {
            mac: Vec::new(),
            net: BROADCAST_NETWORK,
            adr: Vec::new(),
        }
    }

    /// BACnet/IP MAC (4 address bytes followed by the big-endian port)
    pub fn from_socket_addr(addr: SocketAddrV4) -> Self {
        Self::local(encode_bip_mac(addr))
    }

    /// Interpret the MAC as a BACnet/IP endpoint
    pub fn socket_addr(&self) -> Option<SocketAddrV4> {
        decode_bip_mac(&self.mac)
    }

    /// Check if the address needs a local broadcast to reach
    pub fn is_local_broadcast(&self) -> bool {
        self.mac.is_empty()
    }

    /// Same-station comparison used to filter replies
    ///
    /// The remote station address only takes part when a remote network is set.
    pub fn matches(&self, other: &BacnetAddress) -> bool {
        if self.mac != other.mac || self.net != other.net {
            return false;
        }
        if self.net != LOCAL_NETWORK {
            return self.adr == other.adr;
        }
        true
    }

    /// Parse a MAC in any of the accepted textual forms
    ///
    /// Supported forms:
    /// - `10.1.2.3` or `10.1.2.3:47808` (BACnet/IP, 6 bytes)
    /// - `00:21:70:7e:32:bb` (colon separated hex bytes, up to 7)
    /// - `7F` (single byte, MS/TP or ARCNET)
    pub fn parse_mac(text: &str) -> BacnetResult<Vec<u8>> {
        let text = text.trim();
        if let Some(caps) = IPV4_MAC.captures(text) {
            let mut octets = [0u8; 4];
            for (i, octet) in octets.iter_mut().enumerate() {
                *octet = caps[i + 1].parse::<u8>().map_err(|_| {
                    BacnetError::InvalidData(format!("Invalid IPv4 octet in {}", text))
                })?;
            }
            let port = match caps.get(5) {
                Some(port) => port.as_str().parse::<u16>().map_err(|_| {
                    BacnetError::InvalidData(format!("Invalid UDP port in {}", text))
                })?,
                None => DEFAULT_BIP_PORT,
            };
            return Ok(encode_bip_mac(SocketAddrV4::new(Ipv4Addr::from(octets), port)));
        }

        if HEX_MAC.is_match(text) {
            return text
                .split(':')
                .map(|byte| {
                    u8::from_str_radix(byte, 16)
                        .map_err(|_| BacnetError::InvalidData(format!("Invalid MAC byte {}", byte)))
                })
                .collect();
        }

        Err(BacnetError::InvalidData(format!("Invalid MAC address: {}", text)))
    }
}

impl fmt::Display for BacnetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.socket_addr() {
            Some(addr) => write!(f, "{}", addr)?,
            None => write_hex(f, &self.mac)?,
        }
        if self.net != LOCAL_NETWORK {
            write!(f, " net {}", self.net)?;
            if !self.adr.is_empty() {
                f.write_str(" adr ")?;
                write_hex(f, &self.adr)?;
            }
        }
        Ok(())
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if bytes.is_empty() {
        return f.write_str("*");
    }
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(":")?;
        }
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

fn encode_bip_mac(addr: SocketAddrV4) -> Vec<u8> {
    let mut mac = addr.ip().octets().to_vec();
    mac.extend_from_slice(&addr.port().to_be_bytes());
    mac
}

fn decode_bip_mac(mac: &[u8]) -> Option<SocketAddrV4> {
    if mac.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(mac[0], mac[1], mac[2], mac[3]);
    let port = u16::from_be_bytes([mac[4], mac[5]]);
    Some(SocketAddrV4::new(ip, port))
}
