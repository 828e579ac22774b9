//! Inbound events delivered to the session
//!
//! The protocol stack decodes every received APDU into one of these events.
//! Replies carry the sender address and invoke id so the session can ignore
//! anything that does not belong to its own transaction.

use crate::error::BacnetResult;
use bacrpm_core::datatypes::{ErrorCode, ReadAccessResult};
use bacrpm_core::text;
use bacrpm_core::BacnetAddress;

/// An event received from the network
#[derive(Debug)]
pub enum InboundEvent {
    /// ReadPropertyMultiple acknowledgement
    ///
    /// `decoded` is an error when the acknowledgement is malformed.
    ComplexAck {
        source: BacnetAddress,
        invoke_id: u8,
        decoded: BacnetResult<Vec<ReadAccessResult>>,
    },

    /// Error PDU
    Error {
        source: BacnetAddress,
        invoke_id: u8,
        error: ErrorCode,
    },

    /// Abort PDU
    Abort {
        source: BacnetAddress,
        invoke_id: u8,
        reason: u8,
        server: bool,
    },

    /// Reject PDU
    Reject {
        source: BacnetAddress,
        invoke_id: u8,
        reason: u8,
    },

    /// Reply to a confirmed request that cannot be used
    ///
    /// An Error PDU with an undecodable body, or an acknowledgement of the
    /// wrong kind.
    Malformed {
        source: BacnetAddress,
        invoke_id: u8,
        detail: String,
    },

    /// I-Am announcement
    IAm {
        source: BacnetAddress,
        device_id: u32,
        max_apdu: u32,
    },

    /// Anything the session has no interest in
    Unrelated,
}

impl InboundEvent {
    /// Check if the event reports a failed request
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Error { .. } | Self::Abort { .. } | Self::Reject { .. } | Self::Malformed { .. }
        )
    }

    /// Invoke id of replies to confirmed requests
    pub fn invoke_id(&self) -> Option<u8> {
        match self {
            Self::ComplexAck { invoke_id, .. }
            | Self::Error { invoke_id, .. }
            | Self::Abort { invoke_id, .. }
            | Self::Reject { invoke_id, .. }
            | Self::Malformed { invoke_id, .. } => Some(*invoke_id),
            Self::IAm { .. } | Self::Unrelated => None,
        }
    }

    pub fn source(&self) -> Option<&BacnetAddress> {
        match self {
            Self::ComplexAck { source, .. }
            | Self::Error { source, .. }
            | Self::Abort { source, .. }
            | Self::Reject { source, .. }
            | Self::Malformed { source, .. }
            | Self::IAm { source, .. } => Some(source),
            Self::Unrelated => None,
        }
    }

    /// Check whether the event replies to the given transaction
    pub fn belongs_to(&self, address: &BacnetAddress, invoke_id: u8) -> bool {
        match (self.source(), self.invoke_id()) {
            (Some(source), Some(id)) => id == invoke_id && source.matches(address),
            _ => false,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Self::ComplexAck { source, invoke_id, .. } => {
                format!("ReadPropertyMultiple ack from {} (invoke id {})", source, invoke_id)
            }
            Self::Error { source, error, .. } => format!("Error from {}: {}", source, error),
            Self::Abort { source, reason, .. } => format!(
                "Abort from {}: {}",
                source,
                text::name_or_number(text::abort_reason_name(*reason as u32), *reason as u32)
            ),
            Self::Reject { source, reason, .. } => format!(
                "Reject from {}: {}",
                source,
                text::name_or_number(text::reject_reason_name(*reason as u32), *reason as u32)
            ),
            Self::Malformed { source, detail, .. } => format!("Malformed reply from {}: {}", source, detail),
            Self::IAm { source, device_id, .. } => format!("I-Am device {} from {}", device_id, source),
            Self::Unrelated => "Unrelated PDU".to_string(),
        }
    }
}
