//! The result of decoding.
//!
//! Decoding a schema against input produces a tree of [`Value`]s whose
//! shape mirrors the schema: records for constructed types with named
//! fields, lists for the "…OF" types, and leaf variants for the primitive
//! universal types.

use bytes::Bytes;
use crate::int::Integer;
use crate::oid::Oid;
use crate::tag::Tag;


//------------ Value ---------------------------------------------------------

/// A single decoded value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// A BOOLEAN value.
    Boolean(bool),

    /// An INTEGER value.
    Integer(Integer),

    /// A BIT STRING value.
    BitString(BitString),

    /// An OCTET STRING value.
    OctetString(Bytes),

    /// A NULL value.
    Null,

    /// An ENUMERATED value.
    Enumerated(Integer),

    /// An OBJECT IDENTIFIER value.
    Oid(Oid),

    /// A UTF8String value, validated and converted.
    Utf8String(String),

    /// Any of the restricted character string types, kept as raw octets.
    CharacterString(Bytes),

    /// A UTCTime or GeneralizedTime value.
    Time(Time),

    /// A constructed value with named fields.
    Record(Record),

    /// A SEQUENCE OF or SET OF value.
    List(List),

    /// The matched alternative of a CHOICE.
    Choice(Box<ChoiceValue>),

    /// A raw value captured by an ANY node.
    Any(AnyValue),
}

impl Value {
    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(val) => Some(val),
            _ => None
        }
    }

    /// Returns the integer if this is an integer or enumerated value.
    pub fn as_integer(&self) -> Option<&Integer> {
        match *self {
            Value::Integer(ref val) => Some(val),
            Value::Enumerated(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the octets if this is an octet string value.
    pub fn as_octets(&self) -> Option<&Bytes> {
        match *self {
            Value::OctetString(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the object identifier if this is one.
    pub fn as_oid(&self) -> Option<&Oid> {
        match *self {
            Value::Oid(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the string if this is a UTF8String value.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Utf8String(ref val) => Some(val.as_str()),
            _ => None
        }
    }

    /// Returns the record if this is a constructed value.
    pub fn as_record(&self) -> Option<&Record> {
        match *self {
            Value::Record(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the list if this is a SEQUENCE OF or SET OF value.
    pub fn as_list(&self) -> Option<&List> {
        match *self {
            Value::List(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the choice information if this is a matched CHOICE.
    pub fn as_choice(&self) -> Option<&ChoiceValue> {
        match *self {
            Value::Choice(ref val) => Some(val),
            _ => None
        }
    }

    /// Returns the raw value if this was captured by an ANY node.
    pub fn as_any(&self) -> Option<&AnyValue> {
        match *self {
            Value::Any(ref val) => Some(val),
            _ => None
        }
    }
}


//--- From
//
// Mostly for conveniently stating default values in schemas.

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Integer(val.into())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Utf8String(val.into())
    }
}


//------------ Record --------------------------------------------------------

/// The decoded value of a constructed type with named fields.
///
/// Fields keep the order in which the schema declares them. A field that
/// was skipped because it is optional does not appear; a skipped field
/// with a declared default appears with that default.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
    indefinite: bool,
}

impl Record {
    /// Creates an empty record.
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Appends a field to the record.
    pub(crate) fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    /// Marks the record as having used the indefinite length form.
    pub(crate) fn set_indefinite(&mut self) {
        self.indefinite = true;
    }

    /// Returns the value of the field with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find_map(|(field, value)| {
            if *field == name { Some(value) } else { None }
        })
    }

    /// Returns the number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Returns whether the encoded value used the indefinite length form.
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }
}


//------------ List ----------------------------------------------------------

/// The decoded value of a SEQUENCE OF or SET OF type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List {
    items: Vec<Value>,
    indefinite: bool,
}

impl List {
    /// Creates an empty list.
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Appends an element to the list.
    pub(crate) fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Marks the list as having used the indefinite length form.
    pub(crate) fn set_indefinite(&mut self) {
        self.indefinite = true;
    }

    /// Returns the element at the given index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Returns whether the encoded value used the indefinite length form.
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }
}


//------------ ChoiceValue ---------------------------------------------------

/// The matched alternative of a CHOICE node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceValue {
    /// The index of the alternative within the choice declaration.
    index: usize,

    /// The tag the value carried on the wire.
    tag: Tag,

    /// The decoded value of the alternative.
    value: Value,
}

impl ChoiceValue {
    /// Creates a new choice value.
    pub(crate) fn new(index: usize, tag: Tag, value: Value) -> Self {
        ChoiceValue { index, tag, value }
    }

    /// Returns the index of the matched alternative.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the tag the value carried on the wire.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the decoded value of the alternative.
    pub fn value(&self) -> &Value {
        &self.value
    }
}


//------------ AnyValue ------------------------------------------------------

/// A value captured raw by an ANY node.
///
/// Keeps the complete encoding of the value, header octets included, as a
/// shared slice of the input buffer along with the tag information from
/// the header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnyValue {
    tag: Tag,
    constructed: bool,
    encoded: Bytes,
}

impl AnyValue {
    /// Creates a new raw value.
    pub(crate) fn new(tag: Tag, constructed: bool, encoded: Bytes) -> Self {
        AnyValue { tag, constructed, encoded }
    }

    /// Returns the tag of the captured value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns whether the captured value uses constructed encoding.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns the complete encoding of the value.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }
}


//------------ BitString -----------------------------------------------------

/// A BIT STRING value.
///
/// Keeps the bit data in its encoded form: the octets holding the bits in
/// most-significant-first order and the count of unused bits in the final
/// octet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    unused: u8,
    octets: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    pub(crate) fn new(unused: u8, octets: Bytes) -> Self {
        BitString { unused, octets }
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the number of bits in the string.
    pub fn bit_len(&self) -> usize {
        self.octets.len() * 8 - self.unused as usize
    }

    /// Returns the value of the bit at the given index.
    ///
    /// Bit 0 is the most significant bit of the first octet. Bits past
    /// the end of the string are `false`.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.bit_len() {
            return false
        }
        self.octets[index >> 3] & (0x80 >> (index & 7)) != 0
    }

    /// Returns the octets holding the bits.
    pub fn octets(&self) -> &[u8] {
        self.octets.as_ref()
    }
}


//------------ Time ----------------------------------------------------------

/// A decoded UTCTime or GeneralizedTime value.
///
/// The components are kept as the encoding states them together with the
/// UTC offset in minutes. No calendar arithmetic is performed; two times
/// denoting the same instant in different offsets compare unequal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Time {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    offset: i16,
}

impl Time {
    /// Creates a time from its components.
    pub(crate) fn new(
        year: u16, month: u8, day: u8,
        hour: u8, minute: u8, second: u8,
        offset: i16,
    ) -> Self {
        Time { year, month, day, hour, minute, second, offset }
    }

    pub fn year(&self) -> u16 { self.year }
    pub fn month(&self) -> u8 { self.month }
    pub fn day(&self) -> u8 { self.day }
    pub fn hour(&self) -> u8 { self.hour }
    pub fn minute(&self) -> u8 { self.minute }
    pub fn second(&self) -> u8 { self.second }

    /// Returns the UTC offset in minutes.
    pub fn offset(&self) -> i16 { self.offset }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn record_access() {
        let mut record = Record::new();
        record.push("version", Value::Integer(2.into()));
        record.push("critical", Value::Boolean(true));
        assert_eq!(record.len(), 2);
        assert_eq!(
            record.get("version").unwrap().as_integer().unwrap().to_i128(),
            Some(2)
        );
        assert_eq!(record.get("critical").unwrap().as_bool(), Some(true));
        assert!(record.get("missing").is_none());
        assert!(!record.is_indefinite());
        let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["version", "critical"]);
    }

    #[test]
    fn bit_string_bits() {
        // 0b1010_0000 with 4 unused bits: bits 1010.
        let bits = BitString::new(4, Bytes::copy_from_slice(b"\xa0"));
        assert_eq!(bits.bit_len(), 4);
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(2));
        assert!(!bits.bit(3));
        assert!(!bits.bit(4));
        assert!(!bits.bit(100));
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Null.as_bool(), None);
        assert_eq!(Value::Boolean(false).as_bool(), Some(false));
        assert_eq!(
            Value::Utf8String("abc".into()).as_str(), Some("abc")
        );
    }
}
