//! Bit string type for the BACnet application layer

use crate::error::{BacnetError, BacnetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits (zeros and ones). A bit string value can have any length including zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitString {
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits > bytes.len() * 8`
    pub fn new(bytes: Vec<u8>, num_bits: usize) -> BacnetResult<Self> {
        if num_bits > bytes.len() * 8 {
            return Err(BacnetError::InvalidData(format!(
                "bit string is too short to hold all bits. Need {} bytes for {} bits",
                num_bits.div_ceil(8),
                num_bits
            )));
        }

        Ok(Self { bytes, num_bits })
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of unused bits in the last byte, as carried on the wire
    pub fn unused_bits(&self) -> u8 {
        ((self.bytes.len() * 8 - self.num_bits) % 8) as u8
    }

    /// Get the bit at a specific position
    ///
    /// Bit 0 is the most significant bit of the first byte.
    pub fn get_bit(&self, index: usize) -> BacnetResult<bool> {
        if index >= self.num_bits {
            return Err(BacnetError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        Ok((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Iterate over all bits in order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.num_bits).map(move |i| (self.bytes[i / 8] >> (7 - (i % 8))) & 1 == 1)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, bit) in self.bits().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(if bit { "true" } else { "false" })?;
        }
        f.write_str("}")
    }
}
