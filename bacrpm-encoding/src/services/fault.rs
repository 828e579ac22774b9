//! Error PDU payloads

use crate::error::BacnetResult;
use crate::tag::TagDecoder;
use bacrpm_core::datatypes::ErrorCode;

/// Decode the error class and code carried by an Error PDU
///
/// Some devices wrap the pair in context tag 0; both forms are accepted.
pub fn decode_error(data: &[u8]) -> BacnetResult<ErrorCode> {
    let mut decoder = TagDecoder::new(data);
    let wrapped = decoder.next_is_opening(0);
    if wrapped {
        decoder.expect_opening(0)?;
    }
    let class = decoder.decode_application_enumerated()?;
    let code = decoder.decode_application_enumerated()?;
    if wrapped {
        decoder.expect_closing(0)?;
    }
    Ok(ErrorCode::new(class, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_error() {
        assert_eq!(decode_error(&[0x91, 0x01, 0x91, 0x1F]).unwrap(), ErrorCode::new(1, 31));
    }

    #[test]
    fn test_wrapped_error() {
        assert_eq!(
            decode_error(&[0x0E, 0x91, 0x02, 0x91, 0x20, 0x0F]).unwrap(),
            ErrorCode::new(2, 32)
        );
        assert!(decode_error(&[0x0E, 0x91, 0x02, 0x91, 0x20]).is_err());
    }
}
