//! Network layer protocol data unit (clause 6)

use crate::error::{BacnetError, BacnetResult};
use bacrpm_core::address::MAX_MAC_LEN;
use bacrpm_core::{BacnetAddress, LOCAL_NETWORK};
use bytes::{BufMut, BytesMut};

/// Protocol version carried in every NPDU
pub const BACNET_PROTOCOL_VERSION: u8 = 0x01;

/// Hop count given to routed messages
pub const DEFAULT_HOP_COUNT: u8 = 0xFF;

const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
const CONTROL_DESTINATION: u8 = 0x20;
const CONTROL_SOURCE: u8 = 0x08;
const CONTROL_EXPECTING_REPLY: u8 = 0x04;

/// Network number and station address of a routed endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStation {
    pub net: u16,
    pub adr: Vec<u8>,
}

/// Decoded or to-be-encoded NPDU header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NpduHeader {
    pub expecting_reply: bool,
    pub priority: u8,
    pub destination: Option<NetworkStation>,
    pub source: Option<NetworkStation>,
    pub hop_count: u8,
    /// Network layer message type; such NPDUs carry no APDU
    pub network_message: Option<u8>,
}

impl NpduHeader {
    /// Header for an APDU sent to `destination`
    pub fn for_destination(destination: &BacnetAddress, expecting_reply: bool) -> Self {
        let destination = (destination.net != LOCAL_NETWORK).then(|| NetworkStation {
            net: destination.net,
            adr: destination.adr.clone(),
        });
        Self {
            expecting_reply,
            priority: 0,
            hop_count: if destination.is_some() { DEFAULT_HOP_COUNT } else { 0 },
            destination,
            source: None,
            network_message: None,
        }
    }

    pub fn encode(&self, buffer: &mut BytesMut) -> BacnetResult<()> {
        let mut control = self.priority & 0x03;
        if self.network_message.is_some() {
            control |= CONTROL_NETWORK_MESSAGE;
        }
        if self.destination.is_some() {
            control |= CONTROL_DESTINATION;
        }
        if self.source.is_some() {
            control |= CONTROL_SOURCE;
        }
        if self.expecting_reply {
            control |= CONTROL_EXPECTING_REPLY;
        }

        buffer.put_u8(BACNET_PROTOCOL_VERSION);
        buffer.put_u8(control);
        if let Some(destination) = &self.destination {
            encode_station(buffer, destination)?;
        }
        if let Some(source) = &self.source {
            encode_station(buffer, source)?;
        }
        if self.destination.is_some() {
            buffer.put_u8(self.hop_count);
        }
        if let Some(message) = self.network_message {
            buffer.put_u8(message);
        }
        Ok(())
    }

    /// Decode an NPDU header, returning it with the offset of the APDU
    pub fn decode(bytes: &[u8]) -> BacnetResult<(Self, usize)> {
        let mut reader = Reader { bytes, position: 0 };
        let version = reader.byte()?;
        if version != BACNET_PROTOCOL_VERSION {
            return Err(BacnetError::Decoding(format!("Unsupported NPDU version {}", version)));
        }
        let control = reader.byte()?;

        let destination = if control & CONTROL_DESTINATION != 0 {
            Some(reader.station()?)
        } else {
            None
        };
        let source = if control & CONTROL_SOURCE != 0 {
            Some(reader.station()?)
        } else {
            None
        };
        let hop_count = if destination.is_some() { reader.byte()? } else { 0 };
        let network_message = if control & CONTROL_NETWORK_MESSAGE != 0 {
            let message = reader.byte()?;
            // proprietary messages carry a vendor id
            if message >= 0x80 {
                reader.take(2)?;
            }
            Some(message)
        } else {
            None
        };

        Ok((
            Self {
                expecting_reply: control & CONTROL_EXPECTING_REPLY != 0,
                priority: control & 0x03,
                destination,
                source,
                hop_count,
                network_message,
            },
            reader.position,
        ))
    }

    /// Sender address built from the datalink MAC and the NPDU source fields
    pub fn source_address(&self, mac: Vec<u8>) -> BacnetAddress {
        match &self.source {
            Some(source) => BacnetAddress::remote(mac, source.net, source.adr.clone()),
            None => BacnetAddress::local(mac),
        }
    }
}

fn encode_station(buffer: &mut BytesMut, station: &NetworkStation) -> BacnetResult<()> {
    if station.adr.len() > MAX_MAC_LEN {
        return Err(BacnetError::Encoding(format!(
            "Station address of {} octets exceeds {}",
            station.adr.len(),
            MAX_MAC_LEN
        )));
    }
    buffer.put_u16(station.net);
    buffer.put_u8(station.adr.len() as u8);
    buffer.put_slice(&station.adr);
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, length: usize) -> BacnetResult<&'a [u8]> {
        if self.bytes.len() - self.position < length {
            return Err(BacnetError::Decoding("Truncated NPDU".to_string()));
        }
        let slice = &self.bytes[self.position..self.position + length];
        self.position += length;
        Ok(slice)
    }

    fn byte(&mut self) -> BacnetResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn station(&mut self) -> BacnetResult<NetworkStation> {
        let net = self.take(2)?;
        let net = u16::from_be_bytes([net[0], net[1]]);
        let length = self.byte()? as usize;
        let adr = self.take(length)?.to_vec();
        Ok(NetworkStation { net, adr })
    }
}
