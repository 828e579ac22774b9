//! Error re-exports for the client

pub use bacrpm_core::error::{BacnetError, BacnetResult};
