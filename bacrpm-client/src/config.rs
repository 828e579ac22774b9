//! Session and destination configuration

use bacrpm_core::{BacnetAddress, BROADCAST_NETWORK, LOCAL_NETWORK};
use bacrpm_encoding::apdu::MAX_APDU_BIP;
use std::time::Duration;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time to wait for a reply before resending
    pub apdu_timeout: Duration,
    /// Number of resends before a transaction fails
    pub apdu_retries: u8,
    /// Longest wait of a single receive
    pub receive_poll: Duration,
    /// Largest APDU this client accepts
    pub max_apdu: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            apdu_timeout: Duration::from_millis(3000),
            apdu_retries: 3,
            receive_poll: Duration::from_millis(100),
            max_apdu: MAX_APDU_BIP,
        }
    }
}

impl SessionConfig {
    pub fn with_apdu_timeout(mut self, timeout: Duration) -> Self {
        self.apdu_timeout = timeout;
        self
    }

    pub fn with_apdu_retries(mut self, retries: u8) -> Self {
        self.apdu_retries = retries;
        self
    }

    /// Whole seconds one discovery attempt may take
    pub fn attempt_seconds(&self) -> u64 {
        self.apdu_timeout.as_secs()
    }

    /// Lifetime of one bind request, at least a second so that Who-Is is
    /// not repeated on every poll
    pub fn bind_request_lifetime(&self) -> u64 {
        self.attempt_seconds().max(1)
    }

    /// Whole seconds the device binding may take before the session fails
    pub fn binding_timeout_seconds(&self) -> u64 {
        self.attempt_seconds() * self.apdu_retries as u64
    }
}

/// Destination given on the command line instead of discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticBinding {
    pub mac: Option<Vec<u8>>,
    pub dnet: Option<u16>,
    pub dadr: Option<Vec<u8>>,
}

impl StaticBinding {
    /// Check if any part of the destination was given
    pub fn is_specified(&self) -> bool {
        self.mac.is_some() || self.dnet.is_some() || self.dadr.is_some()
    }

    /// Build the destination address
    ///
    /// - MAC and remote station: routed, on `dnet` or the broadcast network
    /// - MAC only: `dnet` or the local network
    /// - neither: broadcast on `dnet` or globally
    ///
    /// A remote station without a MAC is ignored.
    pub fn to_address(&self) -> BacnetAddress {
        let mac = self.mac.clone().unwrap_or_default();
        let adr = self.dadr.clone().unwrap_or_default();
        if !mac.is_empty() && !adr.is_empty() {
            BacnetAddress::remote(mac, self.dnet.unwrap_or(BROADCAST_NETWORK), adr)
        } else if !mac.is_empty() {
            BacnetAddress::remote(mac, self.dnet.unwrap_or(LOCAL_NETWORK), Vec::new())
        } else {
            BacnetAddress::remote(Vec::new(), self.dnet.unwrap_or(BROADCAST_NETWORK), Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.apdu_timeout, Duration::from_secs(3));
        assert_eq!(config.apdu_retries, 3);
        assert_eq!(config.binding_timeout_seconds(), 9);
        assert_eq!(config.max_apdu, 1476);
    }

    #[test]
    fn test_sub_second_timeout_truncates() {
        let config = SessionConfig::default().with_apdu_timeout(Duration::from_millis(2500));
        assert_eq!(config.binding_timeout_seconds(), 6);
        let config = SessionConfig::default().with_apdu_timeout(Duration::from_millis(500));
        assert_eq!(config.binding_timeout_seconds(), 0);
        assert_eq!(config.bind_request_lifetime(), 1);
    }

    #[test]
    fn test_static_binding_rules() {
        let mac = vec![10, 0, 0, 1, 0xBA, 0xC0];

        let routed = StaticBinding {
            mac: Some(mac.clone()),
            dnet: None,
            dadr: Some(vec![0x21]),
        };
        assert_eq!(routed.to_address(), BacnetAddress::remote(mac.clone(), 0xFFFF, vec![0x21]));

        let local = StaticBinding {
            mac: Some(mac.clone()),
            ..Default::default()
        };
        assert_eq!(local.to_address(), BacnetAddress::local(mac.clone()));

        let remote_broadcast = StaticBinding {
            dnet: Some(5),
            dadr: Some(vec![0x21]),
            ..Default::default()
        };
        assert_eq!(remote_broadcast.to_address(), BacnetAddress::remote(Vec::new(), 5, Vec::new()));

        assert!(!StaticBinding::default().is_specified());
        assert_eq!(StaticBinding::default().to_address(), BacnetAddress::broadcast());
    }
}
