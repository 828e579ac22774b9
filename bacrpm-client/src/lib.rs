//! BACnet ReadPropertyMultiple client
//!
//! Binds a device by instance number, sends one batched
//! ReadPropertyMultiple request and collects the acknowledgement into a
//! [`bacrpm_application::ResultDocument`].
//!
//! The session is a small state machine driven by whole-second ticks. It
//! talks to the network only through [`ProtocolStack`]; [`BipStack`] is the
//! BACnet/IP implementation.

pub mod binding;
pub mod config;
pub mod error;
pub mod session;
pub mod stack;

pub use binding::{AddressResolver, DeviceBinding};
pub use config::{SessionConfig, StaticBinding};
pub use error::{BacnetError, BacnetResult};
pub use session::{FailureReason, SessionController, SessionState};
pub use stack::{BipStack, ProtocolStack, TransactionStateMachine, TransactionStatus};
