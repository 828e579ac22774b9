//! Transport layer for the BACnet ReadPropertyMultiple client
//!
//! This crate provides the datalink traits and a BACnet/IP datalink over UDP.

pub mod bip;
pub mod datalink;
pub mod error;

pub use bip::{BipDatalink, BipSettings, MAX_UDP_PAYLOAD_SIZE};
pub use datalink::{DatalinkLayer, FrameAccessor, ReceivedFrame};
pub use error::{BacnetError, BacnetResult};
