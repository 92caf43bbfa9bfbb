//! Errors during decoding.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{error, fmt};
use crate::tag::Tag;


//------------ Pos -----------------------------------------------------------

/// The byte position of an error within the input.
///
/// Positions are measured from the start of the outermost buffer handed to
/// the decoder, even when the error happens inside a synthetic buffer built
/// by the implicit-tag rewrite. In that case the position refers to the
/// start of the rewritten value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pos(usize);

impl Pos {
    /// Returns the position as a plain byte offset.
    pub(crate) fn into_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for Pos {
    fn from(pos: usize) -> Self {
        Pos(pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ ErrorKind -----------------------------------------------------

/// The kind of a decode error.
///
/// The kinds split into two groups. Most describe broken or unexpected
/// input. Two of them, [`TooDeep`][ErrorKind::TooDeep] and
/// [`AmbiguousAny`][ErrorKind::AmbiguousAny], describe a schema the decoder
/// refuses to work with.
///
/// The matcher treats [`MissingField`][ErrorKind::MissingField] and
/// [`TooFewElements`][ErrorKind::TooFewElements] specially: in an optional
/// context they mean "this alternative did not match, try the next one"
/// rather than "the input is broken." All other kinds abort the decode
/// unconditionally.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The encoding violates the BER rules.
    Malformed(&'static str),

    /// A value claims more content octets than the input provides.
    Truncated,

    /// The input did not end exactly at the end of the outermost value.
    LengthMismatch,

    /// A primitive value used the indefinite length form.
    InvalidIndefiniteLength,

    /// A value's tag is in a different class than the schema requires.
    ClassMismatch,

    /// A mandatory field's tag did not appear where the schema requires it.
    ///
    /// Carries the field name, the tag the schema expected there if it
    /// has a fixed one, and the tag actually observed if any value was
    /// present at all.
    MissingField {
        name: &'static str,
        expected: Option<Tag>,
        observed: Option<Tag>,
    },

    /// A SEQUENCE OF or SET OF held fewer elements than its minimum count.
    TooFewElements,

    /// An indefinite length value was not terminated by an end-of-contents.
    MissingEoc,

    /// The input uses a feature the decoder does not support.
    Unimplemented(&'static str),

    /// The schema nests deeper than the decoder's recursion ceiling.
    TooDeep,

    /// An optional ANY without a tag cannot be matched unambiguously.
    AmbiguousAny,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::Malformed(msg) => {
                write!(f, "malformed encoding: {}", msg)
            }
            ErrorKind::Truncated => {
                f.write_str("value extends past the available data")
            }
            ErrorKind::LengthMismatch => {
                f.write_str("input length does not match the decoded value")
            }
            ErrorKind::InvalidIndefiniteLength => {
                f.write_str("indefinite length on a primitive value")
            }
            ErrorKind::ClassMismatch => {
                f.write_str("tag class does not match the schema")
            }
            ErrorKind::MissingField { name, expected, observed } => {
                write!(f, "mandatory field '{}' is missing", name)?;
                if let Some(tag) = expected {
                    write!(f, " (expected {}", tag)?;
                    if let Some(tag) = observed {
                        write!(f, ", found {}", tag)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            ErrorKind::TooFewElements => {
                f.write_str("too few elements in collection")
            }
            ErrorKind::MissingEoc => {
                f.write_str("indefinite length value lacks end-of-contents")
            }
            ErrorKind::Unimplemented(msg) => {
                write!(f, "unsupported encoding: {}", msg)
            }
            ErrorKind::TooDeep => {
                f.write_str("schema nests too deeply")
            }
            ErrorKind::AmbiguousAny => {
                f.write_str("cannot unambiguously match an untagged ANY")
            }
        }
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// Carries the [`ErrorKind`] describing what went wrong and the [`Pos`] of
/// the offending octets within the input.
#[derive(Clone, Debug)]
pub struct DecodeError {
    kind: ErrorKind,
    pos: Pos,
}

impl DecodeError {
    /// Creates a new decode error from a kind and a position.
    pub(crate) fn new(kind: ErrorKind, pos: Pos) -> Self {
        DecodeError { kind, pos }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the position of the error in the input.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns whether a scan in an optional context may absorb the error.
    ///
    /// Only a missing field or a short collection mean "no match here";
    /// everything else signals data that is actually broken and must
    /// propagate even out of optional fields and choice alternatives.
    pub(crate) fn is_soft(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MissingField { .. } | ErrorKind::TooFewElements
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (at position {})", self.kind, self.pos)
    }
}

impl error::Error for DecodeError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn missing(name: &'static str) -> ErrorKind {
        ErrorKind::MissingField { name, expected: None, observed: None }
    }

    #[test]
    fn soft_and_hard_kinds() {
        assert!(DecodeError::new(missing("x"), 0.into()).is_soft());
        assert!(
            DecodeError::new(ErrorKind::TooFewElements, 4.into()).is_soft()
        );
        assert!(
            !DecodeError::new(ErrorKind::Truncated, 0.into()).is_soft()
        );
        assert!(
            !DecodeError::new(
                ErrorKind::Malformed("bad length"), 0.into()
            ).is_soft()
        );
        assert!(
            !DecodeError::new(ErrorKind::ClassMismatch, 0.into()).is_soft()
        );
    }

    #[test]
    fn display() {
        let err = DecodeError::new(missing("serial"), 7.into());
        assert_eq!(
            format!("{}", err),
            "mandatory field 'serial' is missing (at position 7)"
        );
        let err = DecodeError::new(
            ErrorKind::MissingField {
                name: "serial",
                expected: Some(Tag::INTEGER),
                observed: Some(Tag::BOOLEAN),
            },
            7.into(),
        );
        assert_eq!(
            format!("{}", err),
            "mandatory field 'serial' is missing \
             (expected INTEGER, found BOOLEAN) (at position 7)"
        );
    }
}
