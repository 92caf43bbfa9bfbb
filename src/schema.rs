//! Describing the shape of the data to be decoded.
//!
//! A [`Schema`] is an immutable description of one ASN.1 type: a codec
//! saying how its values are encoded plus declaration options such as a
//! schema-level tag, optionality, or a default value. Constructed schemas
//! own their children, so a complete type definition is a single tree that
//! can be built once and used for any number of decodes.
//!
//! Schemas are built through constructor and builder methods:
//!
//! ```
//! use tber::{Schema, Elem};
//!
//! let validity = Schema::sequence(vec![
//!     Elem::new("not_before", Schema::utc_time()),
//!     Elem::new("not_after", Schema::utc_time()),
//! ]);
//! let extension = Schema::sequence(vec![
//!     Elem::new("id", Schema::object_id()),
//!     Elem::new("critical", Schema::boolean().default(false.into())),
//!     Elem::new("value", Schema::octet_string()),
//! ]);
//! let extensions = Schema::sequence_of(
//!     Schema::nested(extension)
//! ).explicit(3).optional();
//! # let _ = (validity, extensions);
//! ```

use crate::tag::{Class, Tag};
use crate::value::Value;


//------------ Tagging -------------------------------------------------------

/// How a schema-level tag relates to the encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tagging {
    /// The schema tag replaces the natural tag of the value.
    Implicit,

    /// The schema tag belongs to an extra constructed envelope around the
    /// naturally tagged value.
    Explicit,
}


//------------ Codec ---------------------------------------------------------

/// How the values of a schema are encoded.
#[derive(Clone, Debug)]
pub enum Codec {
    /// A primitive universal type with the given natural tag.
    Primitive(Tag),

    /// A SEQUENCE or SET with a fixed list of named fields.
    Constructive(Tag, Vec<Elem>),

    /// A reference to another complete schema used as a field.
    Template(Box<Schema>),

    /// A SEQUENCE OF values of a single element schema.
    SequenceOf(Box<Schema>),

    /// A SET OF values of a single element schema.
    SetOf(Box<Schema>),

    /// Exactly one of a list of alternatives.
    Choice(Vec<Schema>),

    /// Any single value, captured raw.
    Any,
}


//------------ Elem ----------------------------------------------------------

/// A named field of a constructed schema.
#[derive(Clone, Debug)]
pub struct Elem {
    name: &'static str,
    schema: Schema,
}

impl Elem {
    /// Creates a field from its name and schema.
    pub fn new(name: &'static str, schema: Schema) -> Self {
        Elem { name, schema }
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the schema of the field.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}


//------------ Schema --------------------------------------------------------

/// The description of one ASN.1 type.
#[derive(Clone, Debug)]
pub struct Schema {
    /// How values of this type are encoded.
    codec: Codec,

    /// The schema-level tag, if the declaration carries one.
    ///
    /// Always paired with a tagging mode; the builder methods keep the
    /// two in sync so a tag without a mode cannot be expressed.
    tag: Option<Tag>,

    /// How the schema-level tag relates to the encoding.
    tagging: Option<Tagging>,

    /// Whether a value may be absent.
    optional: bool,

    /// The value to store when an absent value is allowed a default.
    default: Option<Value>,

    /// The declared minimum number of elements of an "…OF" type.
    min_size: Option<usize>,
}

/// # Creating Schemas
///
impl Schema {
    /// Creates a schema from a codec with no declaration options.
    fn new(codec: Codec) -> Self {
        Schema {
            codec,
            tag: None,
            tagging: None,
            optional: false,
            default: None,
            min_size: None,
        }
    }

    fn primitive(tag: Tag) -> Self {
        Schema::new(Codec::Primitive(tag))
    }

    /// Creates a schema for a BOOLEAN type.
    pub fn boolean() -> Self {
        Schema::primitive(Tag::BOOLEAN)
    }

    /// Creates a schema for an INTEGER type.
    pub fn integer() -> Self {
        Schema::primitive(Tag::INTEGER)
    }

    /// Creates a schema for a BIT STRING type.
    pub fn bit_string() -> Self {
        Schema::primitive(Tag::BIT_STRING)
    }

    /// Creates a schema for an OCTET STRING type.
    pub fn octet_string() -> Self {
        Schema::primitive(Tag::OCTET_STRING)
    }

    /// Creates a schema for a NULL type.
    pub fn null() -> Self {
        Schema::primitive(Tag::NULL)
    }

    /// Creates a schema for an OBJECT IDENTIFIER type.
    pub fn object_id() -> Self {
        Schema::primitive(Tag::OID)
    }

    /// Creates a schema for an ENUMERATED type.
    pub fn enumerated() -> Self {
        Schema::primitive(Tag::ENUMERATED)
    }

    /// Creates a schema for a UTF8String type.
    pub fn utf8_string() -> Self {
        Schema::primitive(Tag::UTF8_STRING)
    }

    /// Creates a schema for a NumericString type.
    pub fn numeric_string() -> Self {
        Schema::primitive(Tag::NUMERIC_STRING)
    }

    /// Creates a schema for a PrintableString type.
    pub fn printable_string() -> Self {
        Schema::primitive(Tag::PRINTABLE_STRING)
    }

    /// Creates a schema for a TeletexString type.
    pub fn teletex_string() -> Self {
        Schema::primitive(Tag::TELETEX_STRING)
    }

    /// Creates a schema for a VideotexString type.
    pub fn videotex_string() -> Self {
        Schema::primitive(Tag::VIDEOTEX_STRING)
    }

    /// Creates a schema for an IA5String type.
    pub fn ia5_string() -> Self {
        Schema::primitive(Tag::IA5_STRING)
    }

    /// Creates a schema for a UTCTime type.
    pub fn utc_time() -> Self {
        Schema::primitive(Tag::UTC_TIME)
    }

    /// Creates a schema for a GeneralizedTime type.
    pub fn generalized_time() -> Self {
        Schema::primitive(Tag::GENERALIZED_TIME)
    }

    /// Creates a schema for a GraphicString type.
    pub fn graphic_string() -> Self {
        Schema::primitive(Tag::GRAPHIC_STRING)
    }

    /// Creates a schema for a VisibleString type.
    pub fn visible_string() -> Self {
        Schema::primitive(Tag::VISIBLE_STRING)
    }

    /// Creates a schema for a GeneralString type.
    pub fn general_string() -> Self {
        Schema::primitive(Tag::GENERAL_STRING)
    }

    /// Creates a schema for a UniversalString type.
    pub fn universal_string() -> Self {
        Schema::primitive(Tag::UNIVERSAL_STRING)
    }

    /// Creates a schema for a BMPString type.
    pub fn bmp_string() -> Self {
        Schema::primitive(Tag::BMP_STRING)
    }

    /// Creates a schema for a SEQUENCE with the given fields.
    pub fn sequence(fields: Vec<Elem>) -> Self {
        Schema::new(Codec::Constructive(Tag::SEQUENCE, fields))
    }

    /// Creates a schema for a SET with the given fields.
    pub fn set(fields: Vec<Elem>) -> Self {
        Schema::new(Codec::Constructive(Tag::SET, fields))
    }

    /// Creates a schema for a SEQUENCE OF values of the element schema.
    pub fn sequence_of(elem: Schema) -> Self {
        Schema::new(Codec::SequenceOf(Box::new(elem)))
    }

    /// Creates a schema for a SET OF values of the element schema.
    pub fn set_of(elem: Schema) -> Self {
        Schema::new(Codec::SetOf(Box::new(elem)))
    }

    /// Creates a schema for a CHOICE between the given alternatives.
    pub fn choice(alternatives: Vec<Schema>) -> Self {
        Schema::new(Codec::Choice(alternatives))
    }

    /// Creates a schema capturing any single value raw.
    pub fn any() -> Self {
        Schema::new(Codec::Any)
    }

    /// Creates a schema using another complete schema as a field.
    pub fn nested(inner: Schema) -> Self {
        Schema::new(Codec::Template(Box::new(inner)))
    }
}

/// # Declaration Options
///
impl Schema {
    /// Tags the schema implicitly with a context-specific tag.
    pub fn implicit(self, number: u32) -> Self {
        self.implicit_in(Class::ContextSpecific, number)
    }

    /// Tags the schema implicitly with a tag of the given class.
    pub fn implicit_in(mut self, class: Class, number: u32) -> Self {
        self.tag = Some(match class {
            Class::Universal => Tag::universal(number),
            Class::Application => Tag::application(number),
            Class::ContextSpecific => Tag::ctx(number),
            Class::Private => Tag::private(number),
        });
        self.tagging = Some(Tagging::Implicit);
        self
    }

    /// Tags the schema explicitly with a context-specific tag.
    pub fn explicit(self, number: u32) -> Self {
        self.explicit_in(Class::ContextSpecific, number)
    }

    /// Tags the schema explicitly with a tag of the given class.
    pub fn explicit_in(mut self, class: Class, number: u32) -> Self {
        self = self.implicit_in(class, number);
        self.tagging = Some(Tagging::Explicit);
        self
    }

    /// Allows values of the schema to be absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Gives the schema a default stored when its value is absent.
    ///
    /// A field with a default may be absent just like an optional field.
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Requires an "…OF" value to hold at least `min` elements.
    pub fn min_size(mut self, min: usize) -> Self {
        self.min_size = Some(min);
        self
    }
}

/// # Access to the Declaration
///
impl Schema {
    /// Returns the codec of the schema.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Returns the schema-level tag if there is one.
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Returns the tagging mode if the schema carries a tag.
    pub fn tagging(&self) -> Option<Tagging> {
        self.tagging
    }

    /// Returns whether values of the schema may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the declared default value if there is one.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the declared minimum element count if there is one.
    pub fn declared_min_size(&self) -> Option<usize> {
        self.min_size
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_options() {
        let schema = Schema::integer().implicit(3).optional();
        assert_eq!(schema.tag(), Some(Tag::ctx(3)));
        assert_eq!(schema.tagging(), Some(Tagging::Implicit));
        assert!(schema.is_optional());
        assert!(schema.default_value().is_none());

        let schema = Schema::boolean().default(Value::Boolean(false));
        assert!(!schema.is_optional());
        assert_eq!(
            schema.default_value(), Some(&Value::Boolean(false))
        );

        let schema = Schema::octet_string().explicit_in(Class::Application, 7);
        assert_eq!(schema.tag(), Some(Tag::application(7)));
        assert_eq!(schema.tagging(), Some(Tagging::Explicit));
    }

    #[test]
    fn constructed_shapes() {
        let schema = Schema::sequence(vec![
            Elem::new("a", Schema::integer()),
            Elem::new("b", Schema::boolean().optional()),
        ]);
        match schema.codec() {
            Codec::Constructive(tag, fields) => {
                assert_eq!(*tag, Tag::SEQUENCE);
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name(), "a");
            }
            _ => panic!("expected a constructive codec"),
        }

        let schema = Schema::set_of(Schema::integer()).min_size(2);
        assert_eq!(schema.declared_min_size(), Some(2));
        assert!(matches!(schema.codec(), Codec::SetOf(_)));
    }
}
