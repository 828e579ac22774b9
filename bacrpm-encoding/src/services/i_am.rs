//! I-Am service (clause 16.10)

use crate::error::{BacnetError, BacnetResult};
use crate::tag::TagDecoder;
use bacrpm_core::ObjectType;

/// Announcement of a device and its capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IAm {
    pub device_id: u32,
    pub max_apdu: u32,
    pub segmentation: u32,
    pub vendor_id: u32,
}

impl IAm {
    /// Decode the service request of an I-Am
    pub fn decode(data: &[u8]) -> BacnetResult<Self> {
        let mut decoder = TagDecoder::new(data);
        let device = decoder.decode_application_object_id()?;
        if device.object_type != ObjectType::DEVICE {
            return Err(BacnetError::Decoding(format!("I-Am for non-device object {}", device)));
        }
        let max_apdu = decoder.decode_application_unsigned()?;
        let segmentation = decoder.decode_application_enumerated()?;
        let vendor_id = decoder.decode_application_unsigned()?;

        Ok(Self {
            device_id: device.instance,
            max_apdu: u32::try_from(max_apdu)
                .map_err(|_| BacnetError::Decoding(format!("Max APDU {} out of range", max_apdu)))?,
            segmentation,
            vendor_id: u32::try_from(vendor_id)
                .map_err(|_| BacnetError::Decoding(format!("Vendor id {} out of range", vendor_id)))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_i_am() {
        // device 1234, max APDU 1476, no segmentation, vendor 260
        let data = [0xC4, 0x02, 0x00, 0x04, 0xD2, 0x22, 0x05, 0xC4, 0x91, 0x03, 0x22, 0x01, 0x04];
        let i_am = IAm::decode(&data).unwrap();
        assert_eq!(i_am.device_id, 1234);
        assert_eq!(i_am.max_apdu, 1476);
        assert_eq!(i_am.segmentation, 3);
        assert_eq!(i_am.vendor_id, 260);
    }

    #[test]
    fn test_reject_non_device() {
        let data = [0xC4, 0x00, 0x00, 0x00, 0x01, 0x21, 0x32, 0x91, 0x03, 0x21, 0x01];
        assert!(IAm::decode(&data).is_err());
    }
}
