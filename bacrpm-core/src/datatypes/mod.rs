//! Data types used in the BACnet application layer

pub mod application_value;
pub mod bit_string;
pub mod date;
pub mod read_access;
pub mod time;

pub use application_value::{ApplicationTag, ApplicationValue};
pub use bit_string::BitString;
pub use date::Date;
pub use read_access::{ErrorCode, PropertyOutcome, PropertyResult, ReadAccessResult, ReadAccessSpec};
pub use time::Time;
