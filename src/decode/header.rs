//! The header of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::tag::Tag;
use super::error::{DecodeError, ErrorKind, Pos};
use super::source::Source;


//------------ Length --------------------------------------------------------

/// The length of the content octets of a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A definite number of content octets.
    Definite(usize),

    /// The value runs until an end-of-contents marker.
    Indefinite,
}

impl Length {
    /// Takes the length octets from the beginning of a source.
    fn take_from(source: &mut Source) -> Result<Self, DecodeError> {
        match source.take_u8().map_err(|_| {
            source.malformed("truncated length octets")
        })? {
            // Short form.
            octet if octet < 0x80 => Ok(Length::Definite(octet as usize)),
            0x80 => Ok(Length::Indefinite),
            0xFF => Err(source.malformed("reserved length octet 0xFF")),
            octet => {
                // Long form. The low nibble-ish bits give the number of
                // subsequent length octets.
                let count = (octet & 0x7F) as usize;
                if count > std::mem::size_of::<usize>() {
                    return Err(DecodeError::new(
                        ErrorKind::Unimplemented(
                            "length octets exceeding usize"
                        ),
                        source.pos(),
                    ))
                }
                let mut len = 0usize;
                for _ in 0..count {
                    len = len << 8 | source.take_u8().map_err(|_| {
                        source.malformed("truncated length octets")
                    })? as usize;
                }
                Ok(Length::Definite(len))
            }
        }
    }

    /// Appends the length octets for a definite length to `target`.
    fn write_into(len: usize, target: &mut Vec<u8>) {
        if len < 0x80 {
            target.push(len as u8);
            return
        }
        let count = (std::mem::size_of::<usize>() as u32 * 8
            - len.leading_zeros() + 7) / 8;
        target.push(0x80 | count as u8);
        for i in (0..count).rev() {
            target.push((len >> (i * 8)) as u8);
        }
    }
}


//------------ Header --------------------------------------------------------

/// The header of a BER encoded value.
///
/// Combines the tag, the constructed bit, and the length read from the
/// identifier and length octets at the start of every value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    /// The tag of the value.
    tag: Tag,

    /// Whether the value uses constructed encoding.
    constructed: bool,

    /// The length of the content octets.
    length: Length,
}

impl Header {
    /// Creates a header from its parts.
    pub(crate) fn new(tag: Tag, constructed: bool, length: Length) -> Self {
        Header { tag, constructed, length }
    }

    /// Takes a header from the beginning of a source.
    ///
    /// The source is only advanced past the header octets, never into the
    /// content. A definite length larger than the remaining data and the
    /// indefinite form on a primitive value are rejected here so the shape
    /// decoders never see either.
    pub(crate) fn take_from(
        source: &mut Source,
    ) -> Result<Self, DecodeError> {
        let (tag, constructed) = Tag::take_from(source)?;
        let length = Length::take_from(source)?;
        match length {
            Length::Definite(len) => {
                if len > source.remaining() {
                    return Err(source.truncated())
                }
            }
            Length::Indefinite => {
                if !constructed {
                    return Err(DecodeError::new(
                        ErrorKind::InvalidIndefiniteLength,
                        source.pos(),
                    ))
                }
            }
        }
        Ok(Header { tag, constructed, length })
    }

    /// Returns the tag of the value.
    pub fn tag(self) -> Tag {
        self.tag
    }

    /// Returns whether the value uses constructed encoding.
    pub fn constructed(self) -> bool {
        self.constructed
    }

    /// Returns the length of the content octets.
    pub fn length(self) -> Length {
        self.length
    }

    /// Returns whether this is the end-of-contents marker.
    ///
    /// The marker must be primitive and empty; anything else carrying the
    /// reserved tag is broken data.
    pub(crate) fn is_eoc(self, pos: Pos) -> Result<bool, DecodeError> {
        if self.tag != Tag::END_OF_CONTENTS {
            return Ok(false)
        }
        if self.constructed || self.length != Length::Definite(0) {
            return Err(DecodeError::new(
                ErrorKind::Malformed("malformed end-of-contents"), pos,
            ))
        }
        Ok(true)
    }

    /// Appends a definite form header to `target`.
    ///
    /// Used to rebuild the natural header of an implicitly tagged value;
    /// the indefinite form is never written since the rewritten content
    /// has a known length by then.
    pub(crate) fn write_into(
        tag: Tag, constructed: bool, len: usize, target: &mut Vec<u8>,
    ) {
        tag.write_into(constructed, target);
        Length::write_into(len, target);
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take(data: &[u8]) -> Result<Header, DecodeError> {
        let mut source = Source::new(data.to_vec().into());
        Header::take_from(&mut source)
    }

    #[test]
    fn short_form() {
        let header = take(b"\x02\x01\x05").unwrap();
        assert_eq!(header.tag(), Tag::INTEGER);
        assert!(!header.constructed());
        assert_eq!(header.length(), Length::Definite(1));
    }

    #[test]
    fn long_form() {
        let mut data = vec![0x04, 0x81, 0x80];
        data.extend(std::iter::repeat(0).take(0x80));
        let header = take(&data).unwrap();
        assert_eq!(header.length(), Length::Definite(0x80));

        let mut data = vec![0x04, 0x82, 0x01, 0x00];
        data.extend(std::iter::repeat(0).take(0x100));
        let header = take(&data).unwrap();
        assert_eq!(header.length(), Length::Definite(0x100));
    }

    #[test]
    fn indefinite_form() {
        let header = take(b"\x30\x80\x00\x00").unwrap();
        assert!(header.constructed());
        assert_eq!(header.length(), Length::Indefinite);
        assert!(matches!(
            take(b"\x04\x80\x00\x00").unwrap_err().kind(),
            ErrorKind::InvalidIndefiniteLength
        ));
    }

    #[test]
    fn bad_lengths() {
        assert!(matches!(
            take(b"\x02\xFF\x00").unwrap_err().kind(),
            ErrorKind::Malformed(_)
        ));
        // Claims two content octets, only one present.
        assert!(matches!(
            take(b"\x02\x02\x05").unwrap_err().kind(),
            ErrorKind::Truncated
        ));
        // Length octets themselves cut off.
        assert!(matches!(
            take(b"\x02\x82\x01").unwrap_err().kind(),
            ErrorKind::Malformed(_)
        ));
    }

    #[test]
    fn eoc_detection() {
        let pos = Pos::default();
        let mut source = Source::new(b"\x00\x00".to_vec().into());
        let header = Header::take_from(&mut source).unwrap();
        assert!(header.is_eoc(pos).unwrap());
        assert!(!take(b"\x02\x01\x05").unwrap().is_eoc(pos).unwrap());
        // Non-empty value with the reserved tag.
        let bad = Header::new(
            Tag::END_OF_CONTENTS, false, Length::Definite(1)
        );
        assert!(bad.is_eoc(pos).is_err());
    }

    #[test]
    fn write_round_trip() {
        for &len in &[0usize, 1, 0x7f, 0x80, 0xff, 0x100, 0x1_0000] {
            let mut buf = Vec::new();
            Header::write_into(Tag::ctx(4), true, len, &mut buf);
            buf.extend(std::iter::repeat(0).take(len));
            let header = take(&buf).unwrap();
            assert_eq!(header.tag(), Tag::ctx(4));
            assert!(header.constructed());
            assert_eq!(header.length(), Length::Definite(len));
        }
    }
}
