//! ASN.1 object identifiers.

use std::fmt;
use bytes::Bytes;


//------------ Oid -----------------------------------------------------------

/// An ASN.1 object identifier.
///
/// Keeps the content octets of the encoded value: a sequence of base-128
/// encoded sub-identifiers where the first combines the first two arcs of
/// the identifier. [`iter`][Self::iter] walks the individual arcs and
/// `Display` prints the familiar dotted notation.
///
/// Arcs wider than 32 bits are preserved in the octets but cannot be
/// iterated or printed individually.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid(Bytes);

impl Oid {
    /// Creates an object identifier from the content octets of a value.
    ///
    /// Returns `None` if the octets are not a well-formed sequence of
    /// sub-identifiers.
    pub(crate) fn from_content(bytes: Bytes) -> Option<Self> {
        if bytes.is_empty() {
            return None
        }
        let mut first = true;
        for &octet in bytes.iter() {
            // A sub-identifier must not start with a padding octet.
            if first && octet == 0x80 {
                return None
            }
            first = octet & 0x80 == 0;
        }
        // The last octet must terminate a sub-identifier.
        if !first {
            return None
        }
        Some(Oid(bytes))
    }

    /// Returns the content octets of the identifier.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an iterator over the arcs of the identifier.
    pub fn iter(&self) -> Iter {
        Iter { octets: self.0.as_ref(), first: true, second: None }
    }
}


//--- Display

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in self.iter() {
            if first {
                first = false;
            }
            else {
                f.write_str(".")?;
            }
            match arc {
                Some(arc) => write!(f, "{}", arc)?,
                None => f.write_str("?")?,
            }
        }
        Ok(())
    }
}


//------------ Iter ----------------------------------------------------------

/// An iterator over the arcs of an object identifier.
///
/// Yields `Some(arc)` for each arc that fits into 32 bits and `None` for
/// an arc that does not.
pub struct Iter<'a> {
    /// The remaining sub-identifier octets.
    octets: &'a [u8],

    /// Whether the first sub-identifier is still to come.
    first: bool,

    /// The second arc, parked while the first is being returned.
    second: Option<Option<u32>>,
}

impl<'a> Iter<'a> {
    /// Takes the next raw sub-identifier from the octets.
    fn next_subid(&mut self) -> Option<Option<u32>> {
        if self.octets.is_empty() {
            return None
        }
        let mut res = 0u32;
        let mut overflow = false;
        loop {
            let octet = self.octets[0];
            self.octets = &self.octets[1..];
            if res & 0xFE00_0000 != 0 {
                overflow = true;
            }
            res = res << 7 | u32::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                break
            }
        }
        Some(if overflow { None } else { Some(res) })
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Option<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(second) = self.second.take() {
            return Some(second)
        }
        if self.first {
            // The first sub-identifier combines the first two arcs.
            self.first = false;
            let subid = self.next_subid()?;
            return Some(match subid {
                Some(subid) if subid < 40 => {
                    self.second = Some(Some(subid));
                    Some(0)
                }
                Some(subid) if subid < 80 => {
                    self.second = Some(Some(subid - 40));
                    Some(1)
                }
                Some(subid) => {
                    self.second = Some(Some(subid - 80));
                    Some(2)
                }
                None => {
                    self.second = Some(None);
                    Some(2)
                }
            })
        }
        self.next_subid()
    }
}


//============ Tests =========================================================
