//! BACnet Virtual Link Control (Annex J)

use crate::error::{BacnetError, BacnetResult};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, SocketAddrV4};

/// BVLL type octet for BACnet/IP
pub const BVLL_TYPE_BIP: u8 = 0x81;

/// Length of the fixed BVLC header
pub const BVLC_HEADER_LEN: usize = 4;

/// BVLC function codes handled by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvlcFunction {
    Result = 0x00,
    ForwardedNpdu = 0x04,
    OriginalUnicastNpdu = 0x0A,
    OriginalBroadcastNpdu = 0x0B,
}

impl BvlcFunction {
    pub fn from_u8(value: u8) -> BacnetResult<Self> {
        match value {
            0x00 => Ok(BvlcFunction::Result),
            0x04 => Ok(BvlcFunction::ForwardedNpdu),
            0x0A => Ok(BvlcFunction::OriginalUnicastNpdu),
            0x0B => Ok(BvlcFunction::OriginalBroadcastNpdu),
            other => Err(BacnetError::Decoding(format!("Unsupported BVLC function 0x{:02X}", other))),
        }
    }
}

/// A decoded BVLC frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BvlcFrame<'a> {
    pub function: BvlcFunction,
    /// Original source of a forwarded NPDU
    pub origin: Option<SocketAddrV4>,
    pub npdu: &'a [u8],
}

/// Wrap an NPDU into a BVLC frame
pub fn encode(function: BvlcFunction, npdu: &[u8]) -> BacnetResult<Bytes> {
    let length = BVLC_HEADER_LEN + npdu.len();
    let length = u16::try_from(length)
        .map_err(|_| BacnetError::Encoding(format!("NPDU too long for BVLC: {} octets", npdu.len())))?;
    let mut buffer = BytesMut::with_capacity(length as usize);
    buffer.put_u8(BVLL_TYPE_BIP);
    buffer.put_u8(function as u8);
    buffer.put_u16(length);
    buffer.put_slice(npdu);
    Ok(buffer.freeze())
}

/// Decode a BVLC frame as received from the socket
pub fn decode(frame: &[u8]) -> BacnetResult<BvlcFrame<'_>> {
    if frame.len() < BVLC_HEADER_LEN {
        return Err(BacnetError::Decoding("BVLC frame shorter than its header".to_string()));
    }
    if frame[0] != BVLL_TYPE_BIP {
        return Err(BacnetError::Decoding(format!("Not a BACnet/IP frame: type 0x{:02X}", frame[0])));
    }
    let function = BvlcFunction::from_u8(frame[1])?;
    let length = u16::from_be_bytes([frame[2], frame[3]]) as usize;
    if length != frame.len() {
        return Err(BacnetError::Decoding(format!(
            "BVLC length {} does not match frame size {}",
            length,
            frame.len()
        )));
    }

    let body = &frame[BVLC_HEADER_LEN..];
    match function {
        BvlcFunction::ForwardedNpdu => {
            if body.len() < 6 {
                return Err(BacnetError::Decoding("Forwarded NPDU without origin".to_string()));
            }
            let ip = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
            let port = u16::from_be_bytes([body[4], body[5]]);
            Ok(BvlcFrame {
                function,
                origin: Some(SocketAddrV4::new(ip, port)),
                npdu: &body[6..],
            })
        }
        _ => Ok(BvlcFrame {
            function,
            origin: None,
            npdu: body,
        }),
    }
}
