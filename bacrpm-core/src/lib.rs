//! Core types and utilities for the BACnet ReadPropertyMultiple client
//!
//! This crate provides the object and property identifiers, network
//! addresses, application-layer values and the error type shared by every
//! other crate in the workspace.

pub mod address;
pub mod datatypes;
pub mod error;
pub mod object_id;
pub mod property;
pub mod text;

pub use address::{BacnetAddress, BROADCAST_NETWORK, LOCAL_NETWORK};
pub use error::{BacnetError, BacnetResult};
pub use object_id::{ObjectReference, ObjectType, MAX_INSTANCE, MAX_OBJECT_TYPE};
pub use property::{ArrayIndex, PropertyId, PropertySpec};
