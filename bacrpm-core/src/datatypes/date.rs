//! BACnet Date type

use crate::error::{BacnetError, BacnetResult};
use crate::text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of any date or time field that is not specified
pub const UNSPECIFIED: u8 = 0xFF;

/// BACnet Date: year offset from 1900, month, day of month and day of week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    octet_string: [u8; 4],
}

impl Date {
    pub const LENGTH: usize = 4;

    /// Constructs a Date
    ///
    /// # Arguments
    ///
    /// * `year` - The year from 1900 to 2154, or `None` if not specified
    /// * `month` - The month from 1 to 12, or 0xff if not specified
    /// * `day` - The day of the month from 1 to 31, or 0xff if not specified
    /// * `weekday` - The day of week from 1 to 7 (1 is Monday), or 0xff if not specified
    pub fn new(year: Option<u16>, month: u8, day: u8, weekday: u8) -> BacnetResult<Self> {
        let year_byte = match year {
            Some(year) if (1900..=2154).contains(&year) => (year - 1900) as u8,
            Some(year) => {
                return Err(BacnetError::InvalidData(format!(
                    "Year is out of range [1900, 2154], got {}",
                    year
                )));
            }
            None => UNSPECIFIED,
        };
        Self::verify(month, "Month", 1, 14)?;
        Self::verify(day, "Day", 1, 34)?;
        Self::verify(weekday, "Weekday", 1, 7)?;
        Ok(Self {
            octet_string: [year_byte, month, day, weekday],
        })
    }

    /// Decode a Date from its 4-byte wire form
    pub fn decode(octet_string: &[u8]) -> BacnetResult<Self> {
        if octet_string.len() != Self::LENGTH {
            return Err(BacnetError::Decoding(format!(
                "Wrong date size. Expected {}, got {}",
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

    pub fn year(&self) -> Option<u16> {
        match self.octet_string[0] {
            UNSPECIFIED => None,
            offset => Some(1900 + offset as u16),
        }
    }

    pub fn month(&self) -> u8 {
        self.octet_string[1]
    }

    pub fn day(&self) -> u8 {
        self.octet_string[2]
    }

    pub fn weekday(&self) -> u8 {
        self.octet_string[3]
    }

    fn verify(value: u8, name: &str, lower_bound: u8, upper_bound: u8) -> BacnetResult<()> {
        if (value < lower_bound || value > upper_bound) && value != UNSPECIFIED {
            Err(BacnetError::InvalidData(format!(
                "{} is out of range [{}, {}], got {}",
                name, lower_bound, upper_bound, value
            )))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Date {
    /// `Monday, January 24, 2011`, with `*` for unspecified fields
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match text::day_of_week_name(self.weekday()) {
            Some(weekday) => write!(f, "{}, ", weekday)?,
            None => f.write_str("*, ")?,
        }
        match text::month_name(self.month()) {
            Some(month) => write!(f, "{} ", month)?,
            None => f.write_str("* ")?,
        }
        match self.day() {
            UNSPECIFIED => f.write_str("*, ")?,
            day => write!(f, "{}, ", day)?,
        }
        match self.year() {
            Some(year) => write!(f, "{}", year),
            None => f.write_str("*"),
        }
    }
}
