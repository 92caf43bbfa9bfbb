//! Unbounded integers.
//!
//! ASN.1 places no limit on the size of INTEGER and ENUMERATED values.
//! The [`Integer`] type keeps the two's-complement content octets of such
//! a value and offers conversions into the native integer types for values
//! that fit.

use std::fmt;
use bytes::Bytes;


//------------ Integer -------------------------------------------------------

/// A signed integer of arbitrary size.
///
/// Stores the content octets of the encoded value: the two's complement of
/// the number in big-endian order, using the smallest number of octets the
/// BER rules allow.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates an integer from the content octets of an encoded value.
    ///
    /// Returns `None` if the octets are not a valid integer encoding:
    /// empty content or a redundant leading octet.
    pub(crate) fn from_content(bytes: Bytes) -> Option<Self> {
        match (bytes.first(), bytes.get(1)) {
            (None, _) => return None,
            (Some(0), Some(x)) if *x < 0x80 => return None,
            (Some(0xFF), Some(x)) if *x >= 0x80 => return None,
            _ => { }
        }
        Some(Integer(bytes))
    }

    /// Returns the content octets of the integer.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the number is negative.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Converts the number into an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            return None
        }
        let mut res = if self.is_negative() { -1i128 } else { 0 };
        for &octet in self.0.iter() {
            res = res << 8 | i128::from(octet);
        }
        Some(res)
    }

    /// Converts the number into a `u64` if it is in range.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() {
            return None
        }
        let slice = if self.0[0] == 0 { &self.0[1..] } else { &self.0[..] };
        if slice.len() > 8 {
            return None
        }
        let mut res = 0u64;
        for &octet in slice {
            res = res << 8 | u64::from(octet);
        }
        Some(res)
    }
}


//--- From

impl From<i64> for Integer {
    fn from(val: i64) -> Self {
        let octets = val.to_be_bytes();
        let mut skip = 0;
        while skip < 7 {
            let lead = octets[skip];
            let next = octets[skip + 1];
            if (lead == 0 && next < 0x80) || (lead == 0xFF && next >= 0x80) {
                skip += 1;
            }
            else {
                break
            }
        }
        Integer(Bytes::copy_from_slice(&octets[skip..]))
    }
}


//--- Display

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_i128() {
            Some(val) => val.fmt(f),
            None => {
                // Wider than 128 bits. Fall back to hexadecimal.
                f.write_str("0x")?;
                for octet in self.0.iter() {
                    write!(f, "{:02x}", octet)?;
                }
                Ok(())
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn from(data: &[u8]) -> Option<Integer> {
        Integer::from_content(Bytes::copy_from_slice(data))
    }

    #[test]
    fn valid_content() {
        assert_eq!(from(b"\x00").unwrap().to_i128(), Some(0));
        assert_eq!(from(b"\x7f").unwrap().to_i128(), Some(127));
        assert_eq!(from(b"\x80").unwrap().to_i128(), Some(-128));
        assert_eq!(from(b"\xff").unwrap().to_i128(), Some(-1));
        assert_eq!(from(b"\x00\x80").unwrap().to_i128(), Some(128));
        assert_eq!(from(b"\x01\x00").unwrap().to_i128(), Some(256));
        assert_eq!(from(b"\xff\x00").unwrap().to_i128(), Some(-256));
    }

    #[test]
    fn invalid_content() {
        assert!(from(b"").is_none());
        assert!(from(b"\x00\x7f").is_none());
        assert!(from(b"\xff\x80").is_none());
    }

    #[test]
    fn to_u64() {
        assert_eq!(from(b"\x00").unwrap().to_u64(), Some(0));
        assert_eq!(
            from(b"\x00\xff\xff\xff\xff\xff\xff\xff\xff").unwrap().to_u64(),
            Some(u64::MAX)
        );
        assert_eq!(from(b"\xff").unwrap().to_u64(), None);
    }

    #[test]
    fn from_i64() {
        for &val in &[0i64, 1, 127, 128, 255, 256, -1, -128, -129, -256,
                      i64::MAX, i64::MIN] {
            let int = Integer::from(val);
            assert_eq!(int.to_i128(), Some(i128::from(val)));
            // Round-tripping through content octets keeps minimality.
            assert_eq!(
                Integer::from_content(Bytes::copy_from_slice(int.as_slice())),
                Some(int)
            );
        }
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", from(b"\x00\x80").unwrap()), "128");
        assert_eq!(format!("{}", from(b"\xff\x00").unwrap()), "-256");
        let wide = from(
            b"\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00"
        ).unwrap();
        assert_eq!(
            format!("{}", wide),
            "0x0100000000000000000000000000000000"
        );
    }
}
