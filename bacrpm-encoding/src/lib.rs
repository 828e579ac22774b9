//! BACnet wire encoding for the ReadPropertyMultiple client
//!
//! This crate provides the tagged application encoding, the BACnet/IP
//! virtual link layer (BVLC), the network layer header (NPDU), APDU
//! framing and the service encodings the client needs:
//! Who-Is, I-Am, ReadPropertyMultiple and the Error PDU payload.

pub mod apdu;
pub mod bvlc;
pub mod error;
pub mod npdu;
pub mod services;
pub mod tag;

pub use apdu::{Apdu, PduType};
pub use bvlc::{BvlcFrame, BvlcFunction};
pub use error::{BacnetError, BacnetResult};
pub use npdu::{NetworkStation, NpduHeader};
pub use tag::{Tag, TagClass, TagDecoder, TagEncoder, TagKind};
