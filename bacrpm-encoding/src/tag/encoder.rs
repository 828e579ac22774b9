//! Tagged encoder for BACnet application data

use crate::error::{BacnetError, BacnetResult};
use crate::tag::types::{CLOSING_TAG, EXTENDED_LENGTH, EXTENDED_TAG_NUMBER, OPENING_TAG, Tag, TagClass, TagKind};
use bacrpm_core::datatypes::{ApplicationTag, ApplicationValue, BitString};
use bacrpm_core::ObjectReference;
use bytes::{BufMut, Bytes, BytesMut};

/// Character set octet for ISO 10646 (UTF-8)
pub const CHARSET_UTF8: u8 = 0;

/// Encoder producing tagged BACnet data
pub struct TagEncoder {
    buffer: BytesMut,
}

impl TagEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Encode a tag header
    pub fn encode_tag(&mut self, tag: &Tag) {
        let mut first = match tag.class {
            TagClass::Application => 0x00,
            TagClass::Context => 0x08,
        };
        let mut extended_length = None;
        match tag.kind {
            TagKind::Length(length) if length < EXTENDED_LENGTH as u32 => first |= length as u8,
            TagKind::Length(length) => {
                first |= EXTENDED_LENGTH;
                extended_length = Some(length);
            }
            TagKind::Opening => first |= OPENING_TAG,
            TagKind::Closing => first |= CLOSING_TAG,
        }

        if tag.number < EXTENDED_TAG_NUMBER {
            self.buffer.put_u8(first | (tag.number << 4));
        } else {
            self.buffer.put_u8(first | (EXTENDED_TAG_NUMBER << 4));
            self.buffer.put_u8(tag.number);
        }

        if let Some(length) = extended_length {
            if length <= 253 {
                self.buffer.put_u8(length as u8);
            } else if length <= u16::MAX as u32 {
                self.buffer.put_u8(254);
                self.buffer.put_u16(length as u16);
            } else {
                self.buffer.put_u8(255);
                self.buffer.put_u32(length);
            }
        }
    }

    pub fn encode_opening_tag(&mut self, number: u8) {
        self.encode_tag(&Tag::opening(number));
    }

    pub fn encode_closing_tag(&mut self, number: u8) {
        self.encode_tag(&Tag::closing(number));
    }

    /// Encode an application-tagged value
    pub fn encode_application_value(&mut self, value: &ApplicationValue) -> BacnetResult<()> {
        let tag = value.tag().to_u8();
        match value {
            ApplicationValue::Null => self.encode_tag(&Tag::application(tag, 0)),
            ApplicationValue::Boolean(b) => self.encode_tag(&Tag::application(tag, *b as u32)),
            ApplicationValue::Unsigned(u) => self.encode_unsigned(Tag::application(tag, 0), *u),
            ApplicationValue::Signed(i) => {
                let bytes = signed_bytes(*i);
                self.encode_tag(&Tag::application(tag, bytes.len() as u32));
                self.buffer.put_slice(&bytes);
            }
            ApplicationValue::Real(f) => {
                self.encode_tag(&Tag::application(tag, 4));
                self.buffer.put_f32(*f);
            }
            ApplicationValue::Double(f) => {
                self.encode_tag(&Tag::application(tag, 8));
                self.buffer.put_f64(*f);
            }
            ApplicationValue::OctetString(bytes) => {
                self.encode_tag(&Tag::application(tag, content_length(bytes.len())?));
                self.buffer.put_slice(bytes);
            }
            ApplicationValue::CharacterString(text) => {
                self.encode_tag(&Tag::application(tag, content_length(text.len() + 1)?));
                self.buffer.put_u8(CHARSET_UTF8);
                self.buffer.put_slice(text.as_bytes());
            }
            ApplicationValue::BitString(bits) => self.encode_bit_string(tag, bits)?,
            ApplicationValue::Enumerated(e) => self.encode_unsigned(Tag::application(tag, 0), *e as u64),
            ApplicationValue::Date(d) => {
                self.encode_tag(&Tag::application(tag, 4));
                self.buffer.put_slice(&d.encode());
            }
            ApplicationValue::Time(t) => {
                self.encode_tag(&Tag::application(tag, 4));
                self.buffer.put_slice(&t.encode());
            }
            ApplicationValue::ObjectId(object) => {
                self.encode_tag(&Tag::application(tag, 4));
                self.buffer.put_u32(object.to_packed()?);
            }
        }
        Ok(())
    }

    pub fn encode_application_unsigned(&mut self, value: u64) {
        self.encode_unsigned(Tag::application(ApplicationTag::UnsignedInt.to_u8(), 0), value);
    }

    pub fn encode_application_enumerated(&mut self, value: u32) {
        self.encode_unsigned(Tag::application(ApplicationTag::Enumerated.to_u8(), 0), value as u64);
    }

    pub fn encode_application_object_id(&mut self, object: &ObjectReference) -> BacnetResult<()> {
        self.encode_application_value(&ApplicationValue::ObjectId(*object))
    }

    pub fn encode_context_unsigned(&mut self, number: u8, value: u64) {
        self.encode_unsigned(Tag::context(number, 0), value);
    }

    pub fn encode_context_enumerated(&mut self, number: u8, value: u32) {
        self.encode_unsigned(Tag::context(number, 0), value as u64);
    }

    pub fn encode_context_object_id(&mut self, number: u8, object: &ObjectReference) -> BacnetResult<()> {
        let packed = object.to_packed()?;
        self.encode_tag(&Tag::context(number, 4));
        self.buffer.put_u32(packed);
        Ok(())
    }

    /// Append raw octets
    pub fn encode_bytes(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get the encoded bytes as a vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Unsigned and enumerated content uses the fewest octets that hold the value
    fn encode_unsigned(&mut self, mut tag: Tag, value: u64) {
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take(7).take_while(|b| **b == 0).count();
        tag.kind = TagKind::Length((8 - skip) as u32);
        self.encode_tag(&tag);
        self.buffer.put_slice(&bytes[skip..]);
    }

    fn encode_bit_string(&mut self, tag: u8, bits: &BitString) -> BacnetResult<()> {
        let bytes = bits.as_bytes();
        self.encode_tag(&Tag::application(tag, content_length(bytes.len() + 1)?));
        self.buffer.put_u8(bits.unused_bits());
        self.buffer.put_slice(bytes);
        Ok(())
    }
}

impl Default for TagEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn content_length(length: usize) -> BacnetResult<u32> {
    u32::try_from(length).map_err(|_| BacnetError::Encoding(format!("Value too long: {} octets", length)))
}

/// Shortest two's complement form of a signed value
fn signed_bytes(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}
