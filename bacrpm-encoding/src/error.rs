//! Error re-exports for the encoding layer

pub use bacrpm_core::error::{BacnetError, BacnetResult};
