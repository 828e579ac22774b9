//! Protocol stack seam between the session and the wire
//!
//! The session never touches sockets or encodings. It asks the stack to
//! send a Who-Is or the batched request, pulls at most one decoded event
//! per tick, and polls the status of its transaction.

pub mod bip;
pub mod tsm;

pub use bip::BipStack;
pub use tsm::{TransactionStateMachine, TransactionStatus};

use crate::error::BacnetResult;
use async_trait::async_trait;
use bacrpm_application::{InboundEvent, RequestBatch};
use bacrpm_core::BacnetAddress;
use std::time::Duration;

/// Operations the session needs from a BACnet protocol stack
#[async_trait]
pub trait ProtocolStack: Send {
    /// Broadcast a Who-Is for a single device instance
    async fn send_who_is(&mut self, device_id: u32) -> BacnetResult<()>;

    /// Send the batched request and start a transaction for it
    ///
    /// # Arguments
    ///
    /// * `destination` - Bound device address
    /// * `max_apdu` - Largest APDU the device accepts
    /// * `batch` - Objects and properties to read
    ///
    /// # Returns
    ///
    /// The invoke id of the new transaction
    async fn send_read_property_multiple(
        &mut self,
        destination: &BacnetAddress,
        max_apdu: u16,
        batch: &RequestBatch,
    ) -> BacnetResult<u8>;

    /// Wait up to `wait` for one inbound event
    async fn receive(&mut self, wait: Duration) -> BacnetResult<Option<InboundEvent>>;

    /// Advance transaction timers, resending where due
    async fn advance_timers(&mut self, elapsed: Duration) -> BacnetResult<()>;

    fn transaction_status(&self, invoke_id: u8) -> TransactionStatus;

    fn release_transaction(&mut self, invoke_id: u8);
}
