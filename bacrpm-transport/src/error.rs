//! Error re-exports for the transport layer

pub use bacrpm_core::error::{BacnetError, BacnetResult};
