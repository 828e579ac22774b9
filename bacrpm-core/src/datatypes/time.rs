//! BACnet Time type

use crate::datatypes::date::UNSPECIFIED;
use crate::error::{BacnetError, BacnetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// BACnet Time: hour, minute, second and hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    octet_string: [u8; 4],
}

impl Time {
    pub const LENGTH: usize = 4;

    /// Constructs a Time, 0xff marks a field as not specified
    pub fn new(hour: u8, minute: u8, second: u8, hundredths: u8) -> BacnetResult<Self> {
        Self::verify(hour, "Hour", 23)?;
        Self::verify(minute, "Minute", 59)?;
        Self::verify(second, "Second", 59)?;
        Self::verify(hundredths, "Hundredths", 99)?;
        Ok(Self {
            octet_string: [hour, minute, second, hundredths],
        })
    }

    /// Decode a Time from its 4-byte wire form
    pub fn decode(octet_string: &[u8]) -> BacnetResult<Self> {
        if octet_string.len() != Self::LENGTH {
            return Err(BacnetError::Decoding(format!(
                "Wrong time size. Expected {}, got {}",
                Self::LENGTH,
                octet_string.len()
            )));
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(octet_string);
        Ok(Self {
            octet_string: bytes,
        })
    }

    pub fn encode(&self) -> [u8; 4] {
        self.octet_string
    }

    fn verify(value: u8, name: &str, upper_bound: u8) -> BacnetResult<()> {
        if value > upper_bound && value != UNSPECIFIED {
            Err(BacnetError::InvalidData(format!(
                "{} is out of range [0, {}], got {}",
                name, upper_bound, value
            )))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Time {
    /// `HH:MM:SS.hh`, with `**` for unspecified fields
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.octet_string.iter().enumerate() {
            match i {
                1 | 2 => f.write_str(":")?,
                3 => f.write_str(".")?,
                _ => {}
            }
            match *field {
                UNSPECIFIED => f.write_str("**")?,
                value => write!(f, "{:02}", value)?,
            }
        }
        Ok(())
    }
}
