//! bacrpm - read BACnet object values by name
//!
//! Object names are mapped to object identifiers through a CSV file, read
//! from one device with a single ReadPropertyMultiple request, and printed
//! as a JSON document keyed by name.
//!
//! # Architecture
//!
//! - `bacrpm-core`: errors, identifiers, addresses and application values
//! - `bacrpm-encoding`: BACnet tag, BVLC, NPDU and APDU codecs
//! - `bacrpm-transport`: BACnet/IP datalink
//! - `bacrpm-application`: name table, request batch, result document
//! - `bacrpm-client`: session state machine and protocol stack
//!
//! # Usage
//!
//! ```no_run
//! use bacrpm::client::{BipStack, SessionConfig, SessionController};
//! ```

pub mod cli;
pub mod output;
pub mod rows;

pub use bacrpm_core::{BacnetAddress, BacnetError, BacnetResult, ObjectReference, ObjectType, PropertyId};
pub use bacrpm_core::datatypes::*;

pub mod application {
    pub use bacrpm_application::*;
}

pub mod client {
    pub use bacrpm_client::*;
}

pub mod transport {
    pub use bacrpm_transport::*;
}

pub mod encoding {
    pub use bacrpm_encoding::*;
}
