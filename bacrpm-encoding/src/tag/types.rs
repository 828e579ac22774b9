//! Tag header types for BACnet application encoding

use crate::error::{BacnetError, BacnetResult};

/// Tag numbers above this value use an extra tag-number octet
pub const EXTENDED_TAG_NUMBER: u8 = 0x0F;

/// Length/value/type field value marking an extended length
pub const EXTENDED_LENGTH: u8 = 5;

/// Length/value/type field of an opening tag
pub const OPENING_TAG: u8 = 6;

/// Length/value/type field of a closing tag
pub const CLOSING_TAG: u8 = 7;

/// Tag class bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Application,
    Context,
}

/// What follows a tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Primitive value with this many content octets
    ///
    /// For application booleans this is the value itself.
    Length(u32),
    /// Start of a constructed context value
    Opening,
    /// End of a constructed context value
    Closing,
}

/// A decoded tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub number: u8,
    pub class: TagClass,
    pub kind: TagKind,
}

impl Tag {
    pub fn application(number: u8, length: u32) -> Self {
        Self {
            number,
            class: TagClass::Application,
            kind: TagKind::Length(length),
        }
    }

    pub fn context(number: u8, length: u32) -> Self {
        Self {
            number,
            class: TagClass::Context,
            kind: TagKind::Length(length),
        }
    }

    pub fn opening(number: u8) -> Self {
        Self {
            number,
            class: TagClass::Context,
            kind: TagKind::Opening,
        }
    }

    pub fn closing(number: u8) -> Self {
        Self {
            number,
            class: TagClass::Context,
            kind: TagKind::Closing,
        }
    }

    pub fn is_context(&self, number: u8) -> bool {
        self.class == TagClass::Context && self.number == number && matches!(self.kind, TagKind::Length(_))
    }

    pub fn is_opening(&self, number: u8) -> bool {
        self.class == TagClass::Context && self.number == number && self.kind == TagKind::Opening
    }

    pub fn is_closing(&self, number: u8) -> bool {
        self.class == TagClass::Context && self.number == number && self.kind == TagKind::Closing
    }

    /// Content length of a primitive tag
    ///
    /// # Errors
    /// Returns `Decoding` for opening and closing tags
    pub fn length(&self) -> BacnetResult<usize> {
        match self.kind {
            TagKind::Length(length) => Ok(length as usize),
            _ => Err(BacnetError::Decoding(format!(
                "Tag {} is constructed, expected a primitive value",
                self.number
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_predicates() {
        assert!(Tag::opening(4).is_opening(4));
        assert!(!Tag::opening(4).is_closing(4));
        assert!(Tag::closing(1).is_closing(1));
        assert!(Tag::context(2, 1).is_context(2));
        assert!(!Tag::application(2, 1).is_context(2));
        assert!(Tag::opening(3).length().is_err());
        assert_eq!(Tag::application(4, 4).length().unwrap(), 4);
    }
}
