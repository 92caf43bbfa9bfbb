//! Capturing a value without a schema.
//!
//! This is a private module.
//!
//! An ANY slot accepts whatever single value is present and keeps its
//! complete encoding. Skipping over the value is trivial for the definite
//! length form. For the indefinite form we have to walk the nested values
//! to find the end-of-contents octets closing the construction, which
//! [`take_any`] does iteratively with an explicit stack of the still open
//! constructions.

use smallvec::SmallVec;
use crate::value::AnyValue;
use super::error::{DecodeError, ErrorKind, Pos};
use super::header::{Header, Length};
use super::source::Source;

/// The most deeply the raw walker lets input-controlled nesting go.
pub(crate) const MAX_NESTING: usize = 64;

/// Takes one complete value off the source, header octets included.
///
/// The source must be positioned at the start of a value. On success the
/// source has advanced past the value's last octet; on failure it is
/// unchanged.
pub(crate) fn take_any(source: &mut Source) -> Result<AnyValue, DecodeError> {
    let start = source.state();
    match take_any_inner(source) {
        Ok(res) => Ok(res),
        Err(err) => {
            source.restore(start);
            Err(err)
        }
    }
}

fn take_any_inner(source: &mut Source) -> Result<AnyValue, DecodeError> {
    let start = source.state();
    let header = Header::take_from(source)?;
    match header.length() {
        Length::Definite(len) => source.advance(len)?,
        Length::Indefinite => skip_indefinite(source)?,
    }
    Ok(AnyValue::new(
        header.tag(), header.constructed(), source.bytes_since(start),
    ))
}

/// Advances the source past the content of an indefinite length value.
///
/// The header of the value has already been read. Definite length values
/// encountered on the way are skipped wholesale; only nested indefinite
/// ones force the walk deeper.
pub(crate) fn skip_indefinite(
    source: &mut Source,
) -> Result<(), DecodeError> {
    // The positions of the headers of the open constructions, kept for
    // reporting which one was left unterminated.
    let mut open: SmallVec<[Pos; 4]> = SmallVec::new();
    open.push(source.pos());
    while let Some(&unclosed) = open.last() {
        if source.is_exhausted() {
            return Err(DecodeError::new(ErrorKind::MissingEoc, unclosed))
        }
        let pos = source.pos();
        let header = Header::take_from(source)?;
        if header.is_eoc(pos)? {
            open.pop();
            continue
        }
        match header.length() {
            Length::Definite(len) => source.advance(len)?,
            Length::Indefinite => {
                if open.len() >= MAX_NESTING {
                    return Err(
                        DecodeError::new(ErrorKind::TooDeep, pos)
                    )
                }
                open.push(pos);
            }
        }
    }
    Ok(())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::tag::Tag;
    use super::*;

    fn source(data: &[u8]) -> Source {
        Source::new(data.to_vec().into())
    }

    #[test]
    fn definite_value() {
        let mut src = source(b"\x02\x01\x2a\xff");
        let val = take_any(&mut src).unwrap();
        assert_eq!(val.tag(), Tag::INTEGER);
        assert!(!val.is_constructed());
        assert_eq!(val.encoded().as_ref(), b"\x02\x01\x2a");
        assert_eq!(src.remaining(), 1);
    }

    #[test]
    fn indefinite_value() {
        let data = b"\x30\x80\x02\x01\x2a\x00\x00";
        let mut src = source(data);
        let val = take_any(&mut src).unwrap();
        assert!(val.is_constructed());
        assert_eq!(val.encoded().as_ref(), data);
        assert!(src.is_exhausted());
    }

    #[test]
    fn nested_indefinite() {
        let data = b"\x30\x80\x31\x80\x02\x01\x01\x00\x00\x02\x01\x02\
                     \x00\x00";
        let mut src = source(data);
        let val = take_any(&mut src).unwrap();
        assert_eq!(val.encoded().as_ref(), &data[..]);
    }

    #[test]
    fn missing_eoc_rewinds() {
        let mut src = source(b"\x30\x80\x02\x01\x2a");
        let before = src.pos();
        let err = take_any(&mut src).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingEoc));
        assert_eq!(src.pos(), before);
    }

    #[test]
    fn nesting_ceiling() {
        let mut data = Vec::new();
        for _ in 0..(MAX_NESTING + 2) {
            data.extend_from_slice(b"\x30\x80");
        }
        for _ in 0..(MAX_NESTING + 2) {
            data.extend_from_slice(b"\x00\x00");
        }
        let mut src = source(&data);
        assert!(matches!(
            take_any(&mut src).unwrap_err().kind(), ErrorKind::TooDeep
        ));
    }
}
