//! Transaction state machine for confirmed requests
//!
//! Each confirmed request gets an invoke id and a timer. When the timer
//! runs out the request is sent again until the retries are used up, after
//! which the transaction is marked failed and waits to be released.

use crate::error::{BacnetError, BacnetResult};
use bacrpm_core::BacnetAddress;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::time::Duration;

/// Status of an invoke id as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Waiting for a reply
    Pending,
    /// Reply received or transaction released; the id is free
    Released,
    /// Retries exhausted without a reply
    Failed,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Released => write!(f, "Released"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone)]
struct Transaction {
    destination: BacnetAddress,
    npdu: Vec<u8>,
    remaining: Duration,
    retry_count: u8,
    failed: bool,
}

/// A request due for resending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resend {
    pub invoke_id: u8,
    pub destination: BacnetAddress,
    pub npdu: Vec<u8>,
}

/// Tracks outstanding confirmed requests
#[derive(Debug)]
pub struct TransactionStateMachine {
    transactions: HashMap<u8, Transaction>,
    next_invoke_id: u8,
    apdu_timeout: Duration,
    retries: u8,
}

impl TransactionStateMachine {
    pub fn new(apdu_timeout: Duration, retries: u8) -> Self {
        Self {
            transactions: HashMap::new(),
            next_invoke_id: 1,
            apdu_timeout,
            retries,
        }
    }

    /// Reserve the next free invoke id
    ///
    /// Ids run from 1 to 255; 0 is never handed out.
    pub fn next_invoke_id(&mut self) -> BacnetResult<u8> {
        for _ in 0..u8::MAX {
            let id = self.next_invoke_id;
            self.next_invoke_id = if self.next_invoke_id == u8::MAX {
                1
            } else {
                self.next_invoke_id + 1
            };
            if !self.transactions.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(BacnetError::Protocol("No free invoke id".to_string()))
    }

    /// Start tracking a request that has just been sent
    pub fn start(&mut self, invoke_id: u8, destination: BacnetAddress, npdu: Vec<u8>) {
        self.transactions.insert(
            invoke_id,
            Transaction {
                destination,
                npdu,
                remaining: self.apdu_timeout,
                retry_count: 0,
                failed: false,
            },
        );
    }

    pub fn status(&self, invoke_id: u8) -> TransactionStatus {
        match self.transactions.get(&invoke_id) {
            None => TransactionStatus::Released,
            Some(transaction) if transaction.failed => TransactionStatus::Failed,
            Some(_) => TransactionStatus::Pending,
        }
    }

    /// Check if a reply from `source` completes the transaction
    pub fn is_reply_to(&self, invoke_id: u8, source: &BacnetAddress) -> bool {
        self.transactions
            .get(&invoke_id)
            .is_some_and(|transaction| !transaction.failed && transaction.destination.matches(source))
    }

    /// Free an invoke id
    pub fn release(&mut self, invoke_id: u8) {
        self.transactions.remove(&invoke_id);
    }

    /// Advance every timer and collect the requests to send again
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Resend> {
        let mut resends = Vec::new();
        for (invoke_id, transaction) in self.transactions.iter_mut() {
            if transaction.failed {
                continue;
            }
            if elapsed < transaction.remaining {
                transaction.remaining -= elapsed;
                continue;
            }
            if transaction.retry_count < self.retries {
                transaction.retry_count += 1;
                transaction.remaining = self.apdu_timeout;
                log::debug!("Invoke id {} timed out, retry {}", invoke_id, transaction.retry_count);
                resends.push(Resend {
                    invoke_id: *invoke_id,
                    destination: transaction.destination.clone(),
                    npdu: transaction.npdu.clone(),
                });
            } else {
                log::debug!("Invoke id {} failed after {} retries", invoke_id, transaction.retry_count);
                transaction.failed = true;
            }
        }
        resends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> BacnetAddress {
        BacnetAddress::local(vec![10, 0, 0, 2, 0xBA, 0xC0])
    }

    #[test]
    fn test_invoke_ids_skip_zero_and_used() {
        let mut tsm = TransactionStateMachine::new(Duration::from_secs(3), 3);
        let first = tsm.next_invoke_id().unwrap();
        assert_eq!(first, 1);
        tsm.start(first, device(), vec![]);
        tsm.next_invoke_id = 255;
        assert_eq!(tsm.next_invoke_id().unwrap(), 255);
        // wraps past 0 and skips the id still in use
        assert_eq!(tsm.next_invoke_id().unwrap(), 2);
    }

    #[test]
    fn test_retries_then_failure() {
        let mut tsm = TransactionStateMachine::new(Duration::from_secs(3), 2);
        tsm.start(1, device(), vec![0x01]);

        assert!(tsm.advance(Duration::from_secs(2)).is_empty());
        assert_eq!(tsm.advance(Duration::from_secs(1)).len(), 1);
        assert_eq!(tsm.advance(Duration::from_secs(3)).len(), 1);
        assert_eq!(tsm.status(1), TransactionStatus::Pending);
        assert!(tsm.advance(Duration::from_secs(3)).is_empty());
        assert_eq!(tsm.status(1), TransactionStatus::Failed);

        tsm.release(1);
        assert_eq!(tsm.status(1), TransactionStatus::Released);
    }

    #[test]
    fn test_reply_matching() {
        let mut tsm = TransactionStateMachine::new(Duration::from_secs(3), 3);
        tsm.start(4, device(), vec![]);
        assert!(tsm.is_reply_to(4, &device()));
        assert!(!tsm.is_reply_to(5, &device()));
        assert!(!tsm.is_reply_to(4, &BacnetAddress::local(vec![1])));
    }
}
