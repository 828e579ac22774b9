//! Tagged decoder for BACnet application data

use crate::error::{BacnetError, BacnetResult};
use crate::tag::types::{CLOSING_TAG, EXTENDED_LENGTH, EXTENDED_TAG_NUMBER, OPENING_TAG, Tag, TagClass, TagKind};
use bacrpm_core::datatypes::{ApplicationTag, ApplicationValue, BitString, Date, Time};
use bacrpm_core::ObjectReference;

/// ISO 10646 UCS-4
const CHARSET_UCS4: u8 = 3;
/// ISO 10646 UCS-2
const CHARSET_UCS2: u8 = 4;
/// ISO 8859-1
const CHARSET_LATIN1: u8 = 5;

/// Decoder for tagged BACnet data
pub struct TagDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> TagDecoder<'a> {
    /// Create a new decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next tag header without consuming it
    pub fn peek_tag(&self) -> BacnetResult<Tag> {
        let mut lookahead = TagDecoder {
            buffer: self.buffer,
            position: self.position,
        };
        lookahead.decode_tag()
    }

    /// Decode a tag header
    pub fn decode_tag(&mut self) -> BacnetResult<Tag> {
        let first = self.read_byte()?;
        let mut number = first >> 4;
        if number == EXTENDED_TAG_NUMBER {
            number = self.read_byte()?;
        }
        let class = if first & 0x08 != 0 {
            TagClass::Context
        } else {
            TagClass::Application
        };

        let lvt = first & 0x07;
        let kind = match (class, lvt) {
            (TagClass::Context, OPENING_TAG) => TagKind::Opening,
            (TagClass::Context, CLOSING_TAG) => TagKind::Closing,
            (_, EXTENDED_LENGTH) => TagKind::Length(self.decode_extended_length()?),
            (TagClass::Application, OPENING_TAG | CLOSING_TAG) => {
                return Err(BacnetError::Decoding(format!(
                    "Invalid length field {} for application tag {}",
                    lvt, number
                )));
            }
            (_, length) => TagKind::Length(length as u32),
        };

        Ok(Tag { number, class, kind })
    }

    /// Decode an application-tagged value, header included
    pub fn decode_application_value(&mut self) -> BacnetResult<ApplicationValue> {
        let tag = self.decode_tag()?;
        if tag.class != TagClass::Application {
            return Err(BacnetError::Decoding(format!(
                "Expected an application tag, found context tag {}",
                tag.number
            )));
        }
        self.decode_application_content(&tag)
    }

    /// Decode the content following an application tag header
    pub fn decode_application_content(&mut self, tag: &Tag) -> BacnetResult<ApplicationValue> {
        let length = tag.length()?;
        Ok(match ApplicationTag::from_u8(tag.number)? {
            ApplicationTag::Null => ApplicationValue::Null,
            // the length field carries the value itself
            ApplicationTag::Boolean => ApplicationValue::Boolean(length != 0),
            ApplicationTag::UnsignedInt => ApplicationValue::Unsigned(self.decode_unsigned(length)?),
            ApplicationTag::SignedInt => ApplicationValue::Signed(self.decode_signed(length)?),
            ApplicationTag::Real => {
                let bytes = self.read_array::<4>(length)?;
                ApplicationValue::Real(f32::from_be_bytes(bytes))
            }
            ApplicationTag::Double => {
                let bytes = self.read_array::<8>(length)?;
                ApplicationValue::Double(f64::from_be_bytes(bytes))
            }
            ApplicationTag::OctetString => ApplicationValue::OctetString(self.read_bytes(length)?.to_vec()),
            ApplicationTag::CharacterString => {
                ApplicationValue::CharacterString(self.decode_character_string(length)?)
            }
            ApplicationTag::BitString => ApplicationValue::BitString(self.decode_bit_string(length)?),
            ApplicationTag::Enumerated => ApplicationValue::Enumerated(self.decode_enumerated(length)?),
            ApplicationTag::Date => {
                let bytes = self.read_array::<4>(length)?;
                ApplicationValue::Date(Date::decode(&bytes)?)
            }
            ApplicationTag::Time => {
                let bytes = self.read_array::<4>(length)?;
                ApplicationValue::Time(Time::decode(&bytes)?)
            }
            ApplicationTag::ObjectId => {
                let bytes = self.read_array::<4>(length)?;
                ApplicationValue::ObjectId(ObjectReference::from_packed(u32::from_be_bytes(bytes)))
            }
        })
    }

    pub fn decode_application_unsigned(&mut self) -> BacnetResult<u64> {
        match self.decode_application_value()? {
            ApplicationValue::Unsigned(value) => Ok(value),
            other => Err(unexpected("unsigned", &other)),
        }
    }

    pub fn decode_application_enumerated(&mut self) -> BacnetResult<u32> {
        match self.decode_application_value()? {
            ApplicationValue::Enumerated(value) => Ok(value),
            other => Err(unexpected("enumerated", &other)),
        }
    }

    pub fn decode_application_object_id(&mut self) -> BacnetResult<ObjectReference> {
        match self.decode_application_value()? {
            ApplicationValue::ObjectId(value) => Ok(value),
            other => Err(unexpected("object identifier", &other)),
        }
    }

    /// Decode a context-tagged unsigned with the given tag number
    pub fn decode_context_unsigned(&mut self, number: u8) -> BacnetResult<u64> {
        let length = self.expect_context(number)?;
        self.decode_unsigned(length)
    }

    /// Decode a context-tagged enumeration with the given tag number
    pub fn decode_context_enumerated(&mut self, number: u8) -> BacnetResult<u32> {
        let length = self.expect_context(number)?;
        self.decode_enumerated(length)
    }

    /// Decode a context-tagged object identifier with the given tag number
    pub fn decode_context_object_id(&mut self, number: u8) -> BacnetResult<ObjectReference> {
        let length = self.expect_context(number)?;
        let bytes = self.read_array::<4>(length)?;
        Ok(ObjectReference::from_packed(u32::from_be_bytes(bytes)))
    }

    /// Check whether the next tag is the given context tag
    pub fn next_is_context(&self, number: u8) -> bool {
        self.peek_tag().map(|tag| tag.is_context(number)).unwrap_or(false)
    }

    pub fn next_is_opening(&self, number: u8) -> bool {
        self.peek_tag().map(|tag| tag.is_opening(number)).unwrap_or(false)
    }

    pub fn next_is_closing(&self, number: u8) -> bool {
        self.peek_tag().map(|tag| tag.is_closing(number)).unwrap_or(false)
    }

    pub fn expect_opening(&mut self, number: u8) -> BacnetResult<()> {
        let tag = self.decode_tag()?;
        if !tag.is_opening(number) {
            return Err(BacnetError::Decoding(format!("Expected opening tag {}, found {:?}", number, tag)));
        }
        Ok(())
    }

    pub fn expect_closing(&mut self, number: u8) -> BacnetResult<()> {
        let tag = self.decode_tag()?;
        if !tag.is_closing(number) {
            return Err(BacnetError::Decoding(format!("Expected closing tag {}, found {:?}", number, tag)));
        }
        Ok(())
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> BacnetResult<u8> {
        let byte = *self
            .buffer
            .get(self.position)
            .ok_or_else(|| BacnetError::Decoding("Not enough bytes".to_string()))?;
        self.position += 1;
        Ok(byte)
    }

    /// Read a fixed number of bytes
    pub fn read_bytes(&mut self, length: usize) -> BacnetResult<&'a [u8]> {
        if self.remaining() < length {
            return Err(BacnetError::Decoding(format!(
                "Not enough bytes: need {}, have {}",
                length,
                self.remaining()
            )));
        }
        let bytes = &self.buffer[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self, length: usize) -> BacnetResult<[u8; N]> {
        if length != N {
            return Err(BacnetError::Decoding(format!("Expected {} content octets, found {}", N, length)));
        }
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    fn expect_context(&mut self, number: u8) -> BacnetResult<usize> {
        let tag = self.decode_tag()?;
        if !tag.is_context(number) {
            return Err(BacnetError::Decoding(format!("Expected context tag {}, found {:?}", number, tag)));
        }
        tag.length()
    }

    fn decode_extended_length(&mut self) -> BacnetResult<u32> {
        match self.read_byte()? {
            254 => {
                let bytes = self.read_bytes(2)?;
                Ok(u16::from_be_bytes([bytes[0], bytes[1]]) as u32)
            }
            255 => {
                let bytes = self.read_bytes(4)?;
                Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            length => Ok(length as u32),
        }
    }

    fn decode_unsigned(&mut self, length: usize) -> BacnetResult<u64> {
        if length == 0 || length > 8 {
            return Err(BacnetError::Decoding(format!("Invalid unsigned length {}", length)));
        }
        Ok(self
            .read_bytes(length)?
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64))
    }

    fn decode_enumerated(&mut self, length: usize) -> BacnetResult<u32> {
        let value = self.decode_unsigned(length)?;
        u32::try_from(value).map_err(|_| BacnetError::Decoding(format!("Enumeration {} out of range", value)))
    }

    fn decode_signed(&mut self, length: usize) -> BacnetResult<i64> {
        if length == 0 || length > 8 {
            return Err(BacnetError::Decoding(format!("Invalid signed length {}", length)));
        }
        let bytes = self.read_bytes(length)?;
        let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
        let mut full = [fill; 8];
        full[8 - length..].copy_from_slice(bytes);
        Ok(i64::from_be_bytes(full))
    }

    fn decode_character_string(&mut self, length: usize) -> BacnetResult<String> {
        if length == 0 {
            return Err(BacnetError::Decoding("Character string without character set".to_string()));
        }
        let charset = self.read_byte()?;
        let bytes = self.read_bytes(length - 1)?;
        Ok(match charset {
            CHARSET_UCS4 => bytes
                .chunks(4)
                .filter_map(|c| (c.len() == 4).then(|| u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .map(|c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
            CHARSET_UCS2 => {
                let units: Vec<u16> = bytes
                    .chunks(2)
                    .filter_map(|c| (c.len() == 2).then(|| u16::from_be_bytes([c[0], c[1]])))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            CHARSET_LATIN1 => bytes.iter().map(|b| *b as char).collect(),
            0 => String::from_utf8_lossy(bytes).into_owned(),
            other => {
                log::debug!("Character set {} not supported, decoding as ISO 8859-1", other);
                bytes.iter().map(|b| *b as char).collect()
            }
        })
    }

    fn decode_bit_string(&mut self, length: usize) -> BacnetResult<BitString> {
        if length == 0 {
            return Err(BacnetError::Decoding("Bit string without unused-bits octet".to_string()));
        }
        let unused = self.read_byte()? as usize;
        let bytes = self.read_bytes(length - 1)?;
        if unused > 7 || (bytes.is_empty() && unused != 0) {
            return Err(BacnetError::Decoding(format!("Invalid unused bit count {}", unused)));
        }
        BitString::new(bytes.to_vec(), bytes.len() * 8 - unused)
    }
}

fn unexpected(expected: &str, found: &ApplicationValue) -> BacnetError {
    BacnetError::Decoding(format!("Expected {}, found {:?}", expected, found.tag()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagEncoder;
    use bacrpm_core::ObjectType;

    #[test]
    fn test_decode_real() {
        let mut decoder = TagDecoder::new(&[0x44, 0x41, 0xAC, 0x00, 0x00]);
        assert_eq!(decoder.decode_application_value().unwrap(), ApplicationValue::Real(21.5));
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_decode_boolean_from_length_field() {
        let mut decoder = TagDecoder::new(&[0x11, 0x10]);
        assert_eq!(decoder.decode_application_value().unwrap(), ApplicationValue::Boolean(true));
        assert_eq!(decoder.decode_application_value().unwrap(), ApplicationValue::Boolean(false));
    }

    #[test]
    fn test_decode_signed_negative() {
        let mut decoder = TagDecoder::new(&[0x32, 0xFF, 0x38]);
        assert_eq!(decoder.decode_application_value().unwrap(), ApplicationValue::Signed(-200));
    }

    #[test]
    fn test_decode_character_sets() {
        let mut decoder = TagDecoder::new(&[0x73, 0x00, b'O', b'K']);
        assert_eq!(
            decoder.decode_application_value().unwrap(),
            ApplicationValue::CharacterString("OK".to_string())
        );

        let mut decoder = TagDecoder::new(&[0x75, 0x05, 0x04, 0x00, b'h', 0x00, b'i']);
        assert_eq!(
            decoder.decode_application_value().unwrap(),
            ApplicationValue::CharacterString("hi".to_string())
        );

        let mut decoder = TagDecoder::new(&[0x72, 0x05, 0xE9]);
        assert_eq!(
            decoder.decode_application_value().unwrap(),
            ApplicationValue::CharacterString("é".to_string())
        );
    }

    #[test]
    fn test_decode_bit_string() {
        let mut decoder = TagDecoder::new(&[0x82, 0x04, 0xA0]);
        match decoder.decode_application_value().unwrap() {
            ApplicationValue::BitString(bits) => {
                assert_eq!(bits.num_bits(), 4);
                assert_eq!(bits.bits().collect::<Vec<_>>(), vec![true, false, true, false]);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_decode_extended_length() {
        let mut bytes = vec![0x65, 0xFE, 0x01, 0x00];
        bytes.extend(std::iter::repeat(0xAA).take(256));
        let mut decoder = TagDecoder::new(&bytes);
        match decoder.decode_application_value().unwrap() {
            ApplicationValue::OctetString(octets) => assert_eq!(octets.len(), 256),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_context_helpers() {
        let mut encoder = TagEncoder::new();
        encoder
            .encode_context_object_id(0, &ObjectReference::new(ObjectType::ANALOG_VALUE, 3))
            .unwrap();
        encoder.encode_opening_tag(1);
        encoder.encode_context_enumerated(2, 85);
        encoder.encode_closing_tag(1);
        let bytes = encoder.to_vec();

        let mut decoder = TagDecoder::new(&bytes);
        assert_eq!(
            decoder.decode_context_object_id(0).unwrap(),
            ObjectReference::new(ObjectType::ANALOG_VALUE, 3)
        );
        assert!(decoder.next_is_opening(1));
        decoder.expect_opening(1).unwrap();
        assert!(decoder.next_is_context(2));
        assert_eq!(decoder.decode_context_enumerated(2).unwrap(), 85);
        assert!(decoder.next_is_closing(1));
        decoder.expect_closing(1).unwrap();
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let mut decoder = TagDecoder::new(&[0x44, 0x41, 0xAC]);
        assert!(decoder.decode_application_value().is_err());
        let mut decoder = TagDecoder::new(&[]);
        assert!(decoder.decode_tag().is_err());
    }
}
