//! Device address cache and bind requests

use bacrpm_core::BacnetAddress;
use std::collections::HashMap;

/// Where a device can be reached and how large a request it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBinding {
    pub address: BacnetAddress,
    pub max_apdu: u16,
}

/// Resolves device instances to network addresses
///
/// Addresses come either from a static entry or from an I-Am answering a
/// pending bind request. Unsolicited I-Am announcements are not cached.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    bindings: HashMap<u32, DeviceBinding>,
    /// Pending bind requests and their age in seconds
    pending: HashMap<u32, u64>,
    request_lifetime: u64,
}

impl AddressResolver {
    /// Create a resolver whose bind requests expire after `request_lifetime` seconds
    pub fn new(request_lifetime: u64) -> Self {
        Self {
            bindings: HashMap::new(),
            pending: HashMap::new(),
            request_lifetime,
        }
    }

    /// Add a binding that needs no discovery
    pub fn add_static(&mut self, device_id: u32, address: BacnetAddress, max_apdu: u16) {
        log::debug!("Static binding for device {}: {}", device_id, address);
        self.pending.remove(&device_id);
        self.bindings.insert(device_id, DeviceBinding { address, max_apdu });
    }

    pub fn resolve(&self, device_id: u32) -> Option<&DeviceBinding> {
        self.bindings.get(&device_id)
    }

    /// Register a bind request
    ///
    /// Returns `true` when a new request was registered and a Who-Is should
    /// be sent.
    pub fn request(&mut self, device_id: u32) -> bool {
        if self.bindings.contains_key(&device_id) || self.pending.contains_key(&device_id) {
            return false;
        }
        self.pending.insert(device_id, 0);
        true
    }

    pub fn is_pending(&self, device_id: u32) -> bool {
        self.pending.contains_key(&device_id)
    }

    /// Age pending requests, dropping the expired ones
    pub fn age(&mut self, elapsed_seconds: u64) {
        let lifetime = self.request_lifetime;
        self.pending.retain(|device_id, age| {
            *age += elapsed_seconds;
            let alive = *age < lifetime;
            if !alive {
                log::debug!("Bind request for device {} expired", device_id);
            }
            alive
        });
    }

    /// Accept an I-Am
    ///
    /// Returns `true` if the device had a pending bind request and is now bound.
    pub fn on_i_am(&mut self, device_id: u32, address: BacnetAddress, max_apdu: u16) -> bool {
        if self.pending.remove(&device_id).is_none() {
            return false;
        }
        log::debug!("Bound device {} to {}", device_id, address);
        self.bindings.insert(device_id, DeviceBinding { address, max_apdu });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> BacnetAddress {
        BacnetAddress::local(vec![10, 0, 0, 2, 0xBA, 0xC0])
    }

    #[test]
    fn test_static_binding_resolves() {
        let mut resolver = AddressResolver::new(3);
        resolver.add_static(7, address(), 1476);
        assert_eq!(resolver.resolve(7).map(|b| b.max_apdu), Some(1476));
        assert!(!resolver.request(7));
    }

    #[test]
    fn test_unsolicited_i_am_ignored() {
        let mut resolver = AddressResolver::new(3);
        assert!(!resolver.on_i_am(7, address(), 480));
        assert!(resolver.resolve(7).is_none());

        assert!(resolver.request(7));
        assert!(!resolver.request(7));
        assert!(resolver.on_i_am(7, address(), 480));
        assert_eq!(resolver.resolve(7).map(|b| b.max_apdu), Some(480));
        assert!(!resolver.is_pending(7));
    }

    #[test]
    fn test_requests_expire() {
        let mut resolver = AddressResolver::new(3);
        resolver.request(7);
        resolver.age(2);
        assert!(resolver.is_pending(7));
        resolver.age(1);
        assert!(!resolver.is_pending(7));
        assert!(resolver.request(7));
    }
}
