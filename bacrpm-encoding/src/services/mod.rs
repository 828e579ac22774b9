//! Service request and acknowledgement encodings

pub mod fault;
pub mod i_am;
pub mod read_property_multiple;
pub mod who_is;

pub use fault::decode_error;
pub use i_am::IAm;
pub use read_property_multiple::{decode_ack, encode_request};
pub use who_is::WhoIs;
