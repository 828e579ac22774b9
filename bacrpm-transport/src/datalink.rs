//! Datalink traits for the transport layer

use crate::error::BacnetResult;
use async_trait::async_trait;
use bacrpm_core::BacnetAddress;
use std::time::Duration;

/// A received NPDU together with the datalink address it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Sender on the local datalink; only `mac` is filled in
    pub source: BacnetAddress,
    pub npdu: Vec<u8>,
}

/// Frame accessor interface to exchange NPDUs with the local network
#[async_trait]
pub trait FrameAccessor: Send + Sync {
    /// Send an NPDU
    ///
    /// # Arguments
    ///
    /// * `destination` - Next hop; an empty MAC means local broadcast
    /// * `npdu` - Encoded network layer PDU
    async fn send(&mut self, destination: &BacnetAddress, npdu: &[u8]) -> BacnetResult<()>;

    /// Wait up to `wait` for the next NPDU
    ///
    /// # Returns
    ///
    /// `None` when nothing usable arrived in time
    async fn receive(&mut self, wait: Duration) -> BacnetResult<Option<ReceivedFrame>>;

    /// Check if the datalink is closed
    fn is_closed(&self) -> bool;

    /// Close the datalink
    async fn close(&mut self) -> BacnetResult<()>;
}

/// Datalink layer trait that extends FrameAccessor
#[async_trait]
pub trait DatalinkLayer: FrameAccessor {
    /// Open the underlying socket or port
    async fn open(&mut self) -> BacnetResult<()>;
}
