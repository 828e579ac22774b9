//! Error re-exports for the application layer

pub use bacrpm_core::error::{BacnetError, BacnetResult};
