//! BACnet tagged encoding (clause 20.2)
//!
//! Every value on the wire is preceded by a tag header carrying the tag
//! number, the class (application or context) and a length. Constructed
//! values are bracketed by opening and closing context tags.

pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::TagDecoder;
pub use encoder::TagEncoder;
pub use types::{Tag, TagClass, TagKind};
