//! The identifier octets of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::{DecodeError, ErrorKind, Source};


//------------ Class ---------------------------------------------------------

/// The class of a BER tag.
///
/// Every tag belongs to one of four classes encoded in the two most
/// significant bits of the first identifier octet. Schema-defined tags used
/// for IMPLICIT and EXPLICIT tagging normally live in the context-specific
/// class, while the standard ASN.1 types use the universal class.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl Class {
    /// Returns the class encoded in the first identifier octet.
    fn from_octet(octet: u8) -> Self {
        match octet & 0xC0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }

    /// Returns the bits of the class for the first identifier octet.
    fn to_octet(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::ContextSpecific => 0x80,
            Class::Private => 0xC0,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::Universal => f.write_str("UNIVERSAL"),
            Class::Application => f.write_str("APPLICATION"),
            Class::ContextSpecific => f.write_str("CONTEXT-SPECIFIC"),
            Class::Private => f.write_str("PRIVATE"),
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a BER encoded value.
///
/// Each BER encoded value starts with a sequence of one or more octets
/// called the _identifier octets._ They encode the class and number of the
/// value's tag as well as whether the value uses primitive or constructed
/// encoding. The `Tag` type represents class and number; the constructed
/// bit travels separately with the header.
///
/// # Limitations
///
/// We can only decode up to four identifier octets. That is, we only
/// support tag numbers between 0 and 0x1f_ffff.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The tag number.
    number: u32,
}

/// # Constants for Often Used Tag Values
///
impl Tag {
    /// The mask for the constructed bit in the first identifier octet.
    const CONSTRUCTED_MASK: u8 = 0x20;

    /// The mask for the tag number bits of a single-octet identifier.
    const SINGLEBYTE_DATA_MASK: u8 = 0x1f;

    /// The mask for the data bits of the subsequent identifier octets.
    const MULTIBYTE_DATA_MASK: u8 = 0x7f;

    /// The continuation bit of the subsequent identifier octets.
    const CONTINUE_MASK: u8 = 0x80;

    /// The largest tag number we support.
    const MAX_NUMBER: u32 = 0x001f_ffff;

    /// The tag marking the end-of-contents in an indefinite length value.
    ///
    /// This is UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Tag::universal(0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Tag::universal(1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Tag::universal(2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Tag::universal(3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Tag::universal(4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Tag::universal(5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Tag::universal(6);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Tag::universal(10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Tag::universal(12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Tag::universal(16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Tag::universal(17);

    /// The tag for the NumericString type, UNIVERSAL 18.
    pub const NUMERIC_STRING: Self = Tag::universal(18);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Tag::universal(19);

    /// The tag for the TeletexString type, UNIVERSAL 20.
    pub const TELETEX_STRING: Self = Tag::universal(20);

    /// The tag for the VideotexString type, UNIVERSAL 21.
    pub const VIDEOTEX_STRING: Self = Tag::universal(21);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Tag::universal(22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Tag::universal(23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Tag::universal(24);

    /// The tag for the GraphicString type, UNIVERSAL 25.
    pub const GRAPHIC_STRING: Self = Tag::universal(25);

    /// The tag for the VisibleString type, UNIVERSAL 26.
    pub const VISIBLE_STRING: Self = Tag::universal(26);

    /// The tag for the GeneralString type, UNIVERSAL 27.
    pub const GENERAL_STRING: Self = Tag::universal(27);

    /// The tag for the UniversalString type, UNIVERSAL 28.
    pub const UNIVERSAL_STRING: Self = Tag::universal(28);

    /// The tag for the BMPString type, UNIVERSAL 29.
    pub const BMP_STRING: Self = Tag::universal(29);
}

impl Tag {
    /// Creates a new tag in the universal class with the given tag number.
    pub const fn universal(number: u32) -> Self {
        Tag { class: Class::Universal, number }
    }

    /// Creates a new tag in the application class with the given tag number.
    pub const fn application(number: u32) -> Self {
        Tag { class: Class::Application, number }
    }

    /// Creates a new tag in the context-specific class.
    pub const fn ctx(number: u32) -> Self {
        Tag { class: Class::ContextSpecific, number }
    }

    /// Creates a new tag in the private class with the given tag number.
    pub const fn private(number: u32) -> Self {
        Tag { class: Class::Private, number }
    }

    /// Returns the class of the tag.
    pub fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(self) -> bool {
        self.class == Class::Universal
    }

    /// Takes a tag from the beginning of a source.
    ///
    /// Upon success, returns both the tag and whether the value is
    /// constructed. Fails with a malformed error if the identifier octets
    /// are truncated and with an unimplemented error for tag numbers we
    /// cannot represent.
    pub(crate) fn take_from(
        source: &mut Source,
    ) -> Result<(Self, bool), DecodeError> {
        let pos = source.pos();
        let first = source.take_u8().map_err(|_| {
            source.malformed("truncated identifier octets")
        })?;
        let constructed = first & Tag::CONSTRUCTED_MASK != 0;
        let class = Class::from_octet(first);
        if first & Tag::SINGLEBYTE_DATA_MASK != Tag::SINGLEBYTE_DATA_MASK {
            let number = u32::from(first & Tag::SINGLEBYTE_DATA_MASK);
            return Ok((Tag { class, number }, constructed))
        }
        let mut number = 0u32;
        for _ in 0..3 {
            let octet = source.take_u8().map_err(|_| {
                source.malformed("truncated identifier octets")
            })?;
            number = number << 7 | u32::from(octet & Tag::MULTIBYTE_DATA_MASK);
            if octet & Tag::CONTINUE_MASK == 0 {
                return Ok((Tag { class, number }, constructed))
            }
        }
        Err(DecodeError::new(
            ErrorKind::Unimplemented("tag numbers larger than 2^21 - 1"),
            pos,
        ))
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub(crate) fn encoded_len(self) -> usize {
        if self.number < 0x1f {
            1
        }
        else if self.number <= 0x7f {
            2
        }
        else if self.number <= 0x3fff {
            3
        }
        else {
            4
        }
    }

    /// Appends the identifier octets of the tag to `target`.
    ///
    /// If `constructed` is `true`, the encoded tag will signal a value in
    /// constructed encoding and primitive encoding otherwise. This is used
    /// when materializing the synthetic header of an implicitly tagged
    /// value; it is not a general purpose encoder.
    pub(crate) fn write_into(
        self, constructed: bool, target: &mut Vec<u8>,
    ) {
        debug_assert!(self.number <= Tag::MAX_NUMBER);
        let mut first = self.class.to_octet();
        if constructed {
            first |= Tag::CONSTRUCTED_MASK;
        }
        if self.number < 0x1f {
            target.push(first | self.number as u8);
            return
        }
        target.push(first | Tag::SINGLEBYTE_DATA_MASK);
        let mut started = false;
        for shift in [14u32, 7] {
            let part = (self.number >> shift) as u8 & Tag::MULTIBYTE_DATA_MASK;
            if part != 0 || started {
                target.push(part | Tag::CONTINUE_MASK);
                started = true;
            }
        }
        target.push(self.number as u8 & Tag::MULTIBYTE_DATA_MASK);
    }
}


//--- Display

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::END_OF_CONTENTS => write!(f, "END-OF-CONTENTS"),
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::NUMERIC_STRING => write!(f, "NumericString"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::TELETEX_STRING => write!(f, "TeletexString"),
            Tag::VIDEOTEX_STRING => write!(f, "VideotexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::GRAPHIC_STRING => write!(f, "GraphicString"),
            Tag::VISIBLE_STRING => write!(f, "VisibleString"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            tag => {
                match tag.class {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::ContextSpecific => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number)
            }
        }
    }
}


//============ Tests =========================================================
