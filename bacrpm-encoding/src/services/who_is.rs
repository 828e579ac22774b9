//! Who-Is service (clause 16.10)

use crate::tag::TagEncoder;

/// Who-Is request, optionally limited to a device instance range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhoIs {
    pub limits: Option<(u32, u32)>,
}

impl WhoIs {
    /// Ask every device to announce itself
    pub fn all() -> Self {
        Self { limits: None }
    }

    /// Ask a single device instance to announce itself
    pub fn device(instance: u32) -> Self {
        Self {
            limits: Some((instance, instance)),
        }
    }

    /// Encode the service request
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = TagEncoder::new();
        if let Some((low, high)) = self.limits {
            encoder.encode_context_unsigned(0, low as u64);
            encoder.encode_context_unsigned(1, high as u64);
        }
        encoder.to_vec()
    }
}
