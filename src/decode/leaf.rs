//! Decoding the content octets of primitive values.
//!
//! This is a private module.
//!
//! The shape decoders hand the content octets of a matched primitive value
//! to [`decode_leaf`] which dispatches on the universal tag number. Most
//! of the restricted character string types share one catch-all path that
//! keeps the raw octets; UTF8String is validated and converted.

use bytes::Bytes;
use crate::int::Integer;
use crate::oid::Oid;
use crate::tag::Tag;
use crate::value::{BitString, Time, Value};
use super::error::{DecodeError, ErrorKind, Pos};


/// Decodes the content octets of a primitive value of the given tag.
pub(crate) fn decode_leaf(
    tag: Tag, content: Bytes, pos: Pos,
) -> Result<Value, DecodeError> {
    match tag {
        Tag::BOOLEAN => decode_boolean(content, pos),
        Tag::INTEGER => {
            Ok(Value::Integer(decode_integer(content, pos)?))
        }
        Tag::BIT_STRING => decode_bit_string(content, pos),
        Tag::NULL => decode_null(content, pos),
        Tag::ENUMERATED => {
            Ok(Value::Enumerated(decode_integer(content, pos)?))
        }
        Tag::OID => decode_oid(content, pos),
        Tag::UTF8_STRING => decode_utf8(content, pos),
        Tag::UTC_TIME => decode_utc_time(content, pos),
        Tag::GENERALIZED_TIME => decode_generalized_time(content, pos),
        Tag::OCTET_STRING => Ok(Value::OctetString(content)),
        // Everything else, i.e., the restricted character string types,
        // keeps its raw octets.
        _ => Ok(Value::CharacterString(content)),
    }
}

/// Returns whether a tag names one of the string-like universal types.
///
/// These are the types for which BER permits fragmented constructed
/// encoding, which we do not support.
pub(crate) fn is_string_type(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::BIT_STRING | Tag::OCTET_STRING | Tag::UTF8_STRING
            | Tag::NUMERIC_STRING | Tag::PRINTABLE_STRING
            | Tag::TELETEX_STRING | Tag::VIDEOTEX_STRING | Tag::IA5_STRING
            | Tag::GRAPHIC_STRING | Tag::VISIBLE_STRING
            | Tag::GENERAL_STRING | Tag::UNIVERSAL_STRING | Tag::BMP_STRING
    )
}

fn malformed(msg: &'static str, pos: Pos) -> DecodeError {
    DecodeError::new(ErrorKind::Malformed(msg), pos)
}

fn decode_boolean(
    content: Bytes, pos: Pos,
) -> Result<Value, DecodeError> {
    if content.len() != 1 {
        return Err(malformed("invalid boolean", pos))
    }
    // BER: any non-zero octet is TRUE.
    Ok(Value::Boolean(content[0] != 0))
}

fn decode_integer(
    content: Bytes, pos: Pos,
) -> Result<Integer, DecodeError> {
    Integer::from_content(content).ok_or_else(|| {
        malformed("invalid integer", pos)
    })
}

fn decode_bit_string(
    content: Bytes, pos: Pos,
) -> Result<Value, DecodeError> {
    let unused = match content.first() {
        Some(&octet) => octet,
        None => return Err(malformed("empty bit string", pos)),
    };
    if unused > 7 || (unused > 0 && content.len() == 1) {
        return Err(malformed("invalid unused bit count", pos))
    }
    Ok(Value::BitString(BitString::new(unused, content.slice(1..))))
}

fn decode_null(content: Bytes, pos: Pos) -> Result<Value, DecodeError> {
    if !content.is_empty() {
        return Err(malformed("invalid NULL", pos))
    }
    Ok(Value::Null)
}

fn decode_oid(content: Bytes, pos: Pos) -> Result<Value, DecodeError> {
    match Oid::from_content(content) {
        Some(oid) => Ok(Value::Oid(oid)),
        None => Err(malformed("invalid object identifier", pos)),
    }
}

fn decode_utf8(content: Bytes, pos: Pos) -> Result<Value, DecodeError> {
    match String::from_utf8(content.to_vec()) {
        Ok(val) => Ok(Value::Utf8String(val)),
        Err(_) => Err(malformed("invalid UTF-8 string", pos)),
    }
}


//------------ Time parsing --------------------------------------------------

/// A little cursor over the ASCII octets of a time value.
struct TimeReader<'a> {
    octets: &'a [u8],
    pos: Pos,
}

impl<'a> TimeReader<'a> {
    fn new(octets: &'a [u8], pos: Pos) -> Self {
        TimeReader { octets, pos }
    }

    fn error(&self) -> DecodeError {
        malformed("invalid time", self.pos)
    }

    /// Reads a fixed two digit decimal number.
    fn take_pair(&mut self) -> Result<u16, DecodeError> {
        if self.octets.len() < 2 {
            return Err(self.error())
        }
        let (pair, tail) = self.octets.split_at(2);
        if !pair[0].is_ascii_digit() || !pair[1].is_ascii_digit() {
            return Err(self.error())
        }
        self.octets = tail;
        Ok(u16::from(pair[0] - b'0') * 10 + u16::from(pair[1] - b'0'))
    }

    /// Reads an optional two digit number, `None` at a non-digit.
    fn take_opt_pair(&mut self) -> Result<Option<u16>, DecodeError> {
        match self.octets.first() {
            Some(octet) if octet.is_ascii_digit() => {
                self.take_pair().map(Some)
            }
            _ => Ok(None)
        }
    }

    /// Reads the timezone suffix: `Z`, an offset, or nothing for local.
    fn take_offset(&mut self) -> Result<i16, DecodeError> {
        let sign = match self.octets.first() {
            None => return Ok(0),
            Some(b'Z') => {
                self.octets = &self.octets[1..];
                return Ok(0)
            }
            Some(b'+') => 1,
            Some(b'-') => -1,
            Some(_) => return Err(self.error()),
        };
        self.octets = &self.octets[1..];
        let hours = self.take_pair()?;
        let minutes = self.take_opt_pair()?.unwrap_or(0);
        if hours > 23 || minutes > 59 {
            return Err(self.error())
        }
        Ok(sign * (hours as i16 * 60 + minutes as i16))
    }

    /// Skips an optional fractional seconds part.
    fn skip_fraction(&mut self) {
        if let Some(b'.') | Some(b',') = self.octets.first() {
            self.octets = &self.octets[1..];
            while let Some(octet) = self.octets.first() {
                if !octet.is_ascii_digit() {
                    break
                }
                self.octets = &self.octets[1..];
            }
        }
    }

    fn finish(
        &self, year: u16, month: u16, day: u16,
        hour: u16, minute: u16, second: u16, offset: i16,
    ) -> Result<Value, DecodeError> {
        if !self.octets.is_empty()
            || !(1..=12).contains(&month) || !(1..=31).contains(&day)
            || hour > 23 || minute > 59 || second > 59
        {
            return Err(self.error())
        }
        Ok(Value::Time(Time::new(
            year, month as u8, day as u8,
            hour as u8, minute as u8, second as u8, offset,
        )))
    }
}

/// Decodes a UTCTime value: `YYMMDDHHMM[SS]` plus timezone.
///
/// Two digit years below 50 land in the 2000s, the rest in the 1900s.
fn decode_utc_time(
    content: Bytes, pos: Pos,
) -> Result<Value, DecodeError> {
    let mut reader = TimeReader::new(content.as_ref(), pos);
    let year = reader.take_pair()?;
    let year = if year < 50 { year + 2000 } else { year + 1900 };
    let month = reader.take_pair()?;
    let day = reader.take_pair()?;
    let hour = reader.take_pair()?;
    let minute = reader.take_pair()?;
    let second = reader.take_opt_pair()?.unwrap_or(0);
    let offset = reader.take_offset()?;
    reader.finish(year, month, day, hour, minute, second, offset)
}

/// Decodes a GeneralizedTime value: `YYYYMMDDHH[MM[SS]][.f…]` plus
/// timezone.
fn decode_generalized_time(
    content: Bytes, pos: Pos,
) -> Result<Value, DecodeError> {
    let mut reader = TimeReader::new(content.as_ref(), pos);
    let year = reader.take_pair()? * 100 + reader.take_pair()?;
    let month = reader.take_pair()?;
    let day = reader.take_pair()?;
    let hour = reader.take_pair()?;
    let minute = reader.take_opt_pair()?.unwrap_or(0);
    let second = reader.take_opt_pair()?.unwrap_or(0);
    reader.skip_fraction();
    let offset = reader.take_offset()?;
    reader.finish(year, month, day, hour, minute, second, offset)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(tag: Tag, content: &[u8]) -> Result<Value, DecodeError> {
        decode_leaf(
            tag, Bytes::copy_from_slice(content), Pos::default()
        )
    }

    #[test]
    fn boolean() {
        assert_eq!(
            leaf(Tag::BOOLEAN, b"\xff").unwrap(), Value::Boolean(true)
        );
        assert_eq!(
            leaf(Tag::BOOLEAN, b"\x00").unwrap(), Value::Boolean(false)
        );
        // BER tolerates any non-zero octet for TRUE.
        assert_eq!(
            leaf(Tag::BOOLEAN, b"\x01").unwrap(), Value::Boolean(true)
        );
        assert!(leaf(Tag::BOOLEAN, b"").is_err());
        assert!(leaf(Tag::BOOLEAN, b"\x00\x00").is_err());
    }

    #[test]
    fn integers() {
        assert_eq!(
            leaf(Tag::INTEGER, b"\x2a").unwrap()
                .as_integer().unwrap().to_i128(),
            Some(42)
        );
        assert!(leaf(Tag::INTEGER, b"").is_err());
        assert!(matches!(
            leaf(Tag::ENUMERATED, b"\x02").unwrap(), Value::Enumerated(_)
        ));
    }

    #[test]
    fn bit_strings() {
        let val = leaf(Tag::BIT_STRING, b"\x04\xa0").unwrap();
        let bits = match val {
            Value::BitString(ref bits) => bits,
            _ => panic!("expected a bit string"),
        };
        assert_eq!(bits.unused(), 4);
        assert_eq!(bits.bit_len(), 4);
        // The empty bit string.
        let val = leaf(Tag::BIT_STRING, b"\x00").unwrap();
        assert!(matches!(val, Value::BitString(ref bits)
            if bits.bit_len() == 0));
        assert!(leaf(Tag::BIT_STRING, b"").is_err());
        assert!(leaf(Tag::BIT_STRING, b"\x08\xa0").is_err());
        assert!(leaf(Tag::BIT_STRING, b"\x01").is_err());
    }

    #[test]
    fn null_and_strings() {
        assert_eq!(leaf(Tag::NULL, b"").unwrap(), Value::Null);
        assert!(leaf(Tag::NULL, b"\x00").is_err());
        assert_eq!(
            leaf(Tag::UTF8_STRING, b"caf\xc3\xa9").unwrap(),
            Value::Utf8String("café".into())
        );
        assert!(leaf(Tag::UTF8_STRING, b"\xff\xfe").is_err());
        assert_eq!(
            leaf(Tag::OCTET_STRING, b"\x01\x02").unwrap(),
            Value::OctetString(Bytes::copy_from_slice(b"\x01\x02"))
        );
        assert_eq!(
            leaf(Tag::PRINTABLE_STRING, b"abc").unwrap(),
            Value::CharacterString(Bytes::copy_from_slice(b"abc"))
        );
    }

    #[test]
    fn object_identifiers() {
        let val = leaf(Tag::OID, b"\x55\x1d\x13").unwrap();
        assert_eq!(
            format!("{}", val.as_oid().unwrap()), "2.5.29.19"
        );
        assert!(leaf(Tag::OID, b"\x55\x80").is_err());
    }

    #[test]
    fn utc_times() {
        let val = leaf(Tag::UTC_TIME, b"260830123456Z").unwrap();
        let time = match val {
            Value::Time(time) => time,
            _ => panic!("expected a time"),
        };
        assert_eq!(
            (time.year(), time.month(), time.day()), (2026, 8, 30)
        );
        assert_eq!(
            (time.hour(), time.minute(), time.second()), (12, 34, 56)
        );
        assert_eq!(time.offset(), 0);

        // Century split and explicit offsets.
        let val = leaf(Tag::UTC_TIME, b"7208301234-0130").unwrap();
        let time = match val {
            Value::Time(time) => time,
            _ => panic!("expected a time"),
        };
        assert_eq!(time.year(), 1972);
        assert_eq!(time.second(), 0);
        assert_eq!(time.offset(), -90);

        assert!(leaf(Tag::UTC_TIME, b"26083012Z").is_err());
        assert!(leaf(Tag::UTC_TIME, b"261330123456Z").is_err());
        assert!(leaf(Tag::UTC_TIME, b"260830123456Zx").is_err());
    }

    #[test]
    fn generalized_times() {
        let val = leaf(
            Tag::GENERALIZED_TIME, b"20260830123456.5Z"
        ).unwrap();
        let time = match val {
            Value::Time(time) => time,
            _ => panic!("expected a time"),
        };
        assert_eq!(time.year(), 2026);
        assert_eq!(time.second(), 56);

        // Reduced accuracy, local time.
        let val = leaf(Tag::GENERALIZED_TIME, b"2026083012").unwrap();
        assert!(matches!(val, Value::Time(time)
            if time.hour() == 12 && time.minute() == 0));

        assert!(leaf(Tag::GENERALIZED_TIME, b"2026").is_err());
    }

    #[test]
    fn string_types() {
        assert!(is_string_type(Tag::OCTET_STRING));
        assert!(is_string_type(Tag::UTF8_STRING));
        assert!(!is_string_type(Tag::INTEGER));
        assert!(!is_string_type(Tag::SEQUENCE));
    }
}
