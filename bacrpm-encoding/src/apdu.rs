//! Application layer protocol data units (clause 20.1)

use crate::error::{BacnetError, BacnetResult};
use bytes::{BufMut, BytesMut};

/// Confirmed service choice of ReadPropertyMultiple
pub const SERVICE_READ_PROPERTY_MULTIPLE: u8 = 14;

/// Unconfirmed service choice of I-Am
pub const SERVICE_I_AM: u8 = 0;

/// Unconfirmed service choice of Who-Is
pub const SERVICE_WHO_IS: u8 = 8;

/// Largest APDU any BACnet/IP device accepts
pub const MAX_APDU_BIP: u16 = 1476;

const PDU_SEGMENTED: u8 = 0x08;
const PDU_MORE_FOLLOWS: u8 = 0x04;
const PDU_SERVER: u8 = 0x01;

/// APDU type in the upper nibble of the first octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl PduType {
    pub fn from_u8(value: u8) -> BacnetResult<Self> {
        Ok(match value {
            0 => PduType::ConfirmedRequest,
            1 => PduType::UnconfirmedRequest,
            2 => PduType::SimpleAck,
            3 => PduType::ComplexAck,
            4 => PduType::SegmentAck,
            5 => PduType::Error,
            6 => PduType::Reject,
            7 => PduType::Abort,
            other => return Err(BacnetError::Decoding(format!("Unknown PDU type {}", other))),
        })
    }
}

/// Encode the "max APDU length accepted" field
pub fn encode_max_apdu(max_apdu: u16) -> u8 {
    match max_apdu {
        0..=127 => 0,
        128..=205 => 1,
        206..=479 => 2,
        480..=1023 => 3,
        1024..=1475 => 4,
        _ => 5,
    }
}

/// Decode the "max APDU length accepted" field
pub fn decode_max_apdu(field: u8) -> u16 {
    match field & 0x0F {
        0 => 50,
        1 => 128,
        2 => 206,
        3 => 480,
        4 => 1024,
        _ => MAX_APDU_BIP,
    }
}

/// Build a confirmed request APDU
pub fn encode_confirmed_request(invoke_id: u8, service_choice: u8, max_apdu: u16, service_data: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(4 + service_data.len());
    buffer.put_u8((PduType::ConfirmedRequest as u8) << 4);
    buffer.put_u8(encode_max_apdu(max_apdu));
    buffer.put_u8(invoke_id);
    buffer.put_u8(service_choice);
    buffer.put_slice(service_data);
    buffer.to_vec()
}

/// Build an unconfirmed request APDU
pub fn encode_unconfirmed_request(service_choice: u8, service_data: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(2 + service_data.len());
    buffer.put_u8((PduType::UnconfirmedRequest as u8) << 4);
    buffer.put_u8(service_choice);
    buffer.put_slice(service_data);
    buffer.to_vec()
}

/// A decoded APDU borrowing its service data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Apdu<'a> {
    ConfirmedRequest {
        invoke_id: u8,
        service_choice: u8,
        data: &'a [u8],
    },
    UnconfirmedRequest {
        service_choice: u8,
        data: &'a [u8],
    },
    SimpleAck {
        invoke_id: u8,
        service_choice: u8,
    },
    ComplexAck {
        invoke_id: u8,
        service_choice: u8,
        segmented: bool,
        data: &'a [u8],
    },
    SegmentAck {
        invoke_id: u8,
    },
    Error {
        invoke_id: u8,
        service_choice: u8,
        data: &'a [u8],
    },
    Reject {
        invoke_id: u8,
        reason: u8,
    },
    Abort {
        invoke_id: u8,
        reason: u8,
        server: bool,
    },
}

impl<'a> Apdu<'a> {
    pub fn decode(bytes: &'a [u8]) -> BacnetResult<Self> {
        let first = *bytes
            .first()
            .ok_or_else(|| BacnetError::Decoding("Empty APDU".to_string()))?;
        let need = |length: usize| -> BacnetResult<()> {
            if bytes.len() < length {
                Err(BacnetError::Decoding(format!("Truncated APDU: {} octets", bytes.len())))
            } else {
                Ok(())
            }
        };

        Ok(match PduType::from_u8(first >> 4)? {
            PduType::ConfirmedRequest => {
                let header = if first & PDU_SEGMENTED != 0 { 6 } else { 4 };
                need(header)?;
                Apdu::ConfirmedRequest {
                    invoke_id: bytes[2],
                    service_choice: bytes[header - 1],
                    data: &bytes[header..],
                }
            }
            PduType::UnconfirmedRequest => {
                need(2)?;
                Apdu::UnconfirmedRequest {
                    service_choice: bytes[1],
                    data: &bytes[2..],
                }
            }
            PduType::SimpleAck => {
                need(3)?;
                Apdu::SimpleAck {
                    invoke_id: bytes[1],
                    service_choice: bytes[2],
                }
            }
            PduType::ComplexAck => {
                let segmented = first & PDU_SEGMENTED != 0;
                let header = if segmented { 5 } else { 3 };
                need(header)?;
                Apdu::ComplexAck {
                    invoke_id: bytes[1],
                    service_choice: bytes[header - 1],
                    segmented: segmented || first & PDU_MORE_FOLLOWS != 0,
                    data: &bytes[header..],
                }
            }
            PduType::SegmentAck => {
                need(2)?;
                Apdu::SegmentAck { invoke_id: bytes[1] }
            }
            PduType::Error => {
                need(3)?;
                Apdu::Error {
                    invoke_id: bytes[1],
                    service_choice: bytes[2],
                    data: &bytes[3..],
                }
            }
            PduType::Reject => {
                need(3)?;
                Apdu::Reject {
                    invoke_id: bytes[1],
                    reason: bytes[2],
                }
            }
            PduType::Abort => {
                need(3)?;
                Apdu::Abort {
                    invoke_id: bytes[1],
                    reason: bytes[2],
                    server: first & PDU_SERVER != 0,
                }
            }
        })
    }

    /// Invoke id of replies to confirmed requests
    pub fn invoke_id(&self) -> Option<u8> {
        match self {
            Apdu::ConfirmedRequest { invoke_id, .. }
            | Apdu::SimpleAck { invoke_id, .. }
            | Apdu::ComplexAck { invoke_id, .. }
            | Apdu::SegmentAck { invoke_id }
            | Apdu::Error { invoke_id, .. }
            | Apdu::Reject { invoke_id, .. }
            | Apdu::Abort { invoke_id, .. } => Some(*invoke_id),
            Apdu::UnconfirmedRequest { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_apdu_field() {
        assert_eq!(encode_max_apdu(1476), 5);
        assert_eq!(encode_max_apdu(480), 3);
        assert_eq!(encode_max_apdu(50), 0);
        assert_eq!(decode_max_apdu(5), 1476);
        assert_eq!(decode_max_apdu(2), 206);
    }

    #[test]
    fn test_confirmed_request_header() {
        let apdu = encode_confirmed_request(7, SERVICE_READ_PROPERTY_MULTIPLE, 1476, &[0xAA]);
        assert_eq!(apdu, vec![0x00, 0x05, 0x07, 0x0E, 0xAA]);

        match Apdu::decode(&apdu).unwrap() {
            Apdu::ConfirmedRequest {
                invoke_id,
                service_choice,
                data,
            } => {
                assert_eq!(invoke_id, 7);
                assert_eq!(service_choice, SERVICE_READ_PROPERTY_MULTIPLE);
                assert_eq!(data, &[0xAA]);
            }
            other => panic!("unexpected APDU {:?}", other),
        }
    }

    #[test]
    fn test_decode_replies() {
        assert_eq!(
            Apdu::decode(&[0x30, 0x03, 0x0E, 0x0C]).unwrap(),
            Apdu::ComplexAck {
                invoke_id: 3,
                service_choice: 14,
                segmented: false,
                data: &[0x0C],
            }
        );
        assert_eq!(
            Apdu::decode(&[0x71, 0x03, 0x04]).unwrap(),
            Apdu::Abort {
                invoke_id: 3,
                reason: 4,
                server: true,
            }
        );
        assert_eq!(
            Apdu::decode(&[0x60, 0x09, 0x02]).unwrap(),
            Apdu::Reject { invoke_id: 9, reason: 2 }
        );
        assert_eq!(Apdu::decode(&[0x60, 0x09, 0x02]).unwrap().invoke_id(), Some(9));
    }

    #[test]
    fn test_segmented_ack_flagged() {
        let apdu = Apdu::decode(&[0x3C, 0x01, 0x00, 0x04, 0x0E, 0x0C]).unwrap();
        match apdu {
            Apdu::ComplexAck { segmented, data, .. } => {
                assert!(segmented);
                assert_eq!(data, &[0x0C]);
            }
            other => panic!("unexpected APDU {:?}", other),
        }
    }

    #[test]
    fn test_truncated() {
        assert!(Apdu::decode(&[]).is_err());
        assert!(Apdu::decode(&[0x30, 0x01]).is_err());
        assert!(Apdu::decode(&[0x90]).is_err());
    }
}
