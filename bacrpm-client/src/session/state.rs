//! Session states and failure reasons
//!
//! ```text
//! Idle -> BindingDevice -> AwaitingAck -> Succeeded
//!   |           |               |
//!   +-----------+---------------+-> Failed(reason)
//! ```
//!
//! A session binds one device, sends one request and ends in `Succeeded`
//! or `Failed`. It never leaves a terminal state.

use bacrpm_core::datatypes::ErrorCode;
use bacrpm_core::text;
use std::fmt::{self, Display};

/// Why a session ended without success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The device never answered the Who-Is
    AddressResolutionTimeout,
    /// The request went unanswered through every retry
    TransactionTimeout,
    /// The device answered with an Error PDU
    Error(ErrorCode),
    /// The device or a router aborted the transaction
    Abort(u8),
    /// The device rejected the request
    Reject(u8),
    /// The acknowledgement could not be decoded
    MalformedResponse(String),
    /// Sending or receiving failed locally
    Transport(String),
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressResolutionTimeout => write!(f, "Error: APDU Timeout!"),
            Self::TransactionTimeout => write!(f, "Error: TSM Timeout!"),
            Self::Error(error) => write!(f, "BACnet Error: {}", error),
            Self::Abort(reason) => write!(
                f,
                "BACnet Abort: {}",
                text::name_or_number(text::abort_reason_name(*reason as u32), *reason as u32)
            ),
            Self::Reject(reason) => write!(
                f,
                "BACnet Reject: {}",
                text::name_or_number(text::reject_reason_name(*reason as u32), *reason as u32)
            ),
            Self::MalformedResponse(detail) => write!(f, "RPM Ack Malformed! ({})", detail),
            Self::Transport(detail) => write!(f, "Error: {}", detail),
        }
    }
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not started
    #[default]
    Idle,
    /// Waiting for the device address
    BindingDevice,
    /// Request sent, waiting for its acknowledgement
    AwaitingAck,
    /// Acknowledgement received and the transaction released
    Succeeded,
    /// Ended without success
    Failed(FailureReason),
}

impl SessionState {
    /// Check if the session has ended
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Check if the session is waiting on the network
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::BindingDevice | Self::AwaitingAck)
    }

    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check whether moving to `next` keeps the state order
    #[must_use]
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        match (self, next) {
            (Self::Idle, Self::BindingDevice | Self::AwaitingAck | Self::Failed(_)) => true,
            (Self::BindingDevice, Self::AwaitingAck | Self::Failed(_)) => true,
            (Self::AwaitingAck, Self::Succeeded | Self::Failed(_)) => true,
            _ => false,
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::BindingDevice => write!(f, "BindingDevice"),
            Self::AwaitingAck => write!(f, "AwaitingAck"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(SessionState::BindingDevice.is_pending());
        assert!(SessionState::Succeeded.is_terminal());
        assert!(SessionState::Failed(FailureReason::TransactionTimeout).is_terminal());
        assert_eq!(
            SessionState::Failed(FailureReason::TransactionTimeout).failure(),
            Some(&FailureReason::TransactionTimeout)
        );
    }

    #[test]
    fn test_transitions_are_monotonic() {
        let failed = SessionState::Failed(FailureReason::AddressResolutionTimeout);
        assert!(SessionState::Idle.can_transition_to(&SessionState::BindingDevice));
        assert!(SessionState::BindingDevice.can_transition_to(&SessionState::AwaitingAck));
        assert!(SessionState::AwaitingAck.can_transition_to(&SessionState::Succeeded));
        assert!(!SessionState::AwaitingAck.can_transition_to(&SessionState::BindingDevice));
        assert!(!SessionState::BindingDevice.can_transition_to(&SessionState::Succeeded));
        assert!(!SessionState::Succeeded.can_transition_to(&failed));
        assert!(!failed.can_transition_to(&SessionState::Succeeded));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(FailureReason::AddressResolutionTimeout.to_string(), "Error: APDU Timeout!");
        assert_eq!(FailureReason::TransactionTimeout.to_string(), "Error: TSM Timeout!");
        assert_eq!(
            FailureReason::Error(ErrorCode::new(1, 31)).to_string(),
            "BACnet Error: object: unknown-object"
        );
        assert_eq!(FailureReason::Abort(4).to_string(), "BACnet Abort: segmentation-not-supported");
        assert_eq!(FailureReason::Reject(9).to_string(), "BACnet Reject: unrecognized-service");
        assert_eq!(SessionState::Succeeded.to_string(), "Succeeded");
    }
}
