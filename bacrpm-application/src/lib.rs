//! Application layer for the BACnet ReadPropertyMultiple client
//!
//! This crate provides the name cross-reference table, the request builder
//! that turns point names into a ReadPropertyMultiple batch, the inbound
//! event type the session consumes, and the transcoder that turns the
//! decoded acknowledgement into a flat named document.

pub mod document;
pub mod error;
pub mod events;
pub mod request;
pub mod transcoder;
pub mod xref;

pub use document::{DecodedValue, FieldValue, ResultDocument};
pub use error::{BacnetError, BacnetResult};
pub use events::InboundEvent;
pub use request::{NameResolutionMiss, RequestBatch, RequestSetBuilder};
pub use transcoder::ResponseTranscoder;
pub use xref::{CrossReferenceTable, MAX_NAME_LEN};
