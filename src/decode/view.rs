//! Resolved schema attributes for a single decode step.
//!
//! This is a private module.
//!
//! Several decoding steps consult the same schema node: the matcher needs
//! its effective tag, the rewriter its natural tag, the dispatcher its
//! codec and options. [`NodeView`] resolves all of these once when the
//! decoder arrives at a node and keeps them in plain fields for the rest
//! of that visit. A view lives on the decoding stack and is never shared:
//! each choice alternative and each element of an "…OF" value gets a
//! fresh one.

use crate::schema::{Codec, Schema, Tagging};
use crate::tag::Tag;
use crate::value::Value;
use super::error::{DecodeError, ErrorKind, Pos};
use super::header::Header;


//------------ NodeView ------------------------------------------------------

/// The resolved attributes of one schema node.
pub(crate) struct NodeView<'a> {
    /// The node itself.
    schema: &'a Schema,

    /// The name under which a decoded value is stored.
    name: &'static str,

    /// The tag this node expects on the wire.
    ///
    /// This is the schema-level tag if the node carries one and the tag
    /// natural to the codec otherwise. `None` for codecs that match any
    /// tag, i.e., choices and untagged ANY nodes.
    wire_tag: Option<Tag>,

    /// The tag natural to the codec, ignoring any schema-level tag.
    ///
    /// This is the tag the implicit rewrite substitutes back in.
    natural_tag: Option<Tag>,

    /// The tagging mode, present exactly when a schema-level tag is.
    tagging: Option<Tagging>,

    /// Whether an absent value is tolerated here.
    skippable: bool,

    /// The minimum number of matched children or elements.
    min_size: usize,
}

impl<'a> NodeView<'a> {
    /// Creates the view of a schema node.
    pub fn new(name: &'static str, schema: &'a Schema) -> Self {
        NodeView {
            schema,
            name,
            wire_tag: wire_tag(schema),
            natural_tag: codec_tag(schema.codec()),
            tagging: schema.tagging(),
            skippable: schema.is_optional() || schema.default_value().is_some(),
            min_size: resolve_min_size(schema),
        }
    }

    /// Creates a view with the schema-level tag stripped.
    ///
    /// Used after an explicit envelope has been peeled: the inner value
    /// is matched against the codec's natural expectations.
    pub fn untagged(name: &'static str, schema: &'a Schema) -> Self {
        let mut res = NodeView::new(name, schema);
        res.wire_tag = codec_tag(schema.codec());
        res.tagging = None;
        res
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn codec(&self) -> &'a Codec {
        self.schema.codec()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wire_tag(&self) -> Option<Tag> {
        self.wire_tag
    }

    pub fn natural_tag(&self) -> Option<Tag> {
        self.natural_tag
    }

    pub fn tagging(&self) -> Option<Tagging> {
        self.tagging
    }

    /// Returns whether this node may be absent without error.
    pub fn is_skippable(&self) -> bool {
        self.skippable
    }

    /// Returns the default stored when this node is absent.
    pub fn default_value(&self) -> Option<&'a Value> {
        self.schema.default_value()
    }

    /// Returns the minimum matched-children or element count.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Decides whether an observed header satisfies this node.
    ///
    /// Returns `Ok(true)` on a match and `Ok(false)` when the tag number
    /// does not fit, leaving skip-or-fail to the caller. A value whose
    /// tag number matches but whose class differs is broken data, not a
    /// near miss, and fails hard.
    pub fn matches(
        &self, header: Header, pos: Pos,
    ) -> Result<bool, DecodeError> {
        let expected = match self.wire_tag {
            Some(tag) => tag,
            None => return Ok(true),
        };
        if header.tag().number() != expected.number() {
            return Ok(false)
        }
        if header.tag().class() != expected.class() {
            return Err(DecodeError::new(ErrorKind::ClassMismatch, pos))
        }
        Ok(true)
    }

    /// Creates the error for this node failing to appear.
    ///
    /// Carries the tag the node expected and, when a value was present
    /// but did not fit, the tag observed in its place.
    pub fn missing(
        &self, observed: Option<Tag>, pos: Pos,
    ) -> DecodeError {
        DecodeError::new(
            ErrorKind::MissingField {
                name: self.name,
                expected: self.wire_tag,
                observed,
            },
            pos,
        )
    }
}


//------------ Resolution helpers --------------------------------------------

/// Returns the tag a schema expects on the wire.
fn wire_tag(schema: &Schema) -> Option<Tag> {
    match schema.tag() {
        Some(tag) => Some(tag),
        None => codec_tag(schema.codec()),
    }
}

/// Returns the tag natural to a codec.
fn codec_tag(codec: &Codec) -> Option<Tag> {
    match *codec {
        Codec::Primitive(tag) => Some(tag),
        Codec::Constructive(tag, _) => Some(tag),
        Codec::Template(ref inner) => wire_tag(inner),
        Codec::SequenceOf(_) => Some(Tag::SEQUENCE),
        Codec::SetOf(_) => Some(Tag::SET),
        Codec::Choice(_) | Codec::Any => None,
    }
}

/// Resolves the minimum matched count of a schema node.
///
/// A constructed node defaults to the number of fields that cannot be
/// skipped. An "…OF" node defaults to one element, so an empty value only
/// decodes when the node says so through an explicit minimum of zero or
/// by being optional.
fn resolve_min_size(schema: &Schema) -> usize {
    if let Some(min) = schema.declared_min_size() {
        return min
    }
    match *schema.codec() {
        Codec::Constructive(_, ref fields) => {
            fields.iter().filter(|elem| {
                !elem.schema().is_optional()
                    && elem.schema().default_value().is_none()
            }).count()
        }
        Codec::SequenceOf(_) | Codec::SetOf(_) => 1,
        _ => 0,
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::Elem;
    use crate::decode::header::Length;

    #[test]
    fn wire_and_natural_tags() {
        let schema = Schema::integer();
        let view = NodeView::new("x", &schema);
        assert_eq!(view.wire_tag(), Some(Tag::INTEGER));
        assert_eq!(view.natural_tag(), Some(Tag::INTEGER));

        let schema = Schema::integer().implicit(3);
        let view = NodeView::new("x", &schema);
        assert_eq!(view.wire_tag(), Some(Tag::ctx(3)));
        assert_eq!(view.natural_tag(), Some(Tag::INTEGER));

        let schema = Schema::sequence_of(Schema::integer());
        let view = NodeView::new("x", &schema);
        assert_eq!(view.wire_tag(), Some(Tag::SEQUENCE));

        // A nested schema contributes its own wire tag.
        let inner = Schema::sequence(vec![]).implicit(1);
        let schema = Schema::nested(inner);
        let view = NodeView::new("x", &schema);
        assert_eq!(view.wire_tag(), Some(Tag::ctx(1)));

        let schema = Schema::any();
        let view = NodeView::new("x", &schema);
        assert_eq!(view.wire_tag(), None);
        assert_eq!(view.natural_tag(), None);
    }

    #[test]
    fn untagged_view() {
        let schema = Schema::integer().explicit(0);
        let view = NodeView::untagged("x", &schema);
        assert_eq!(view.wire_tag(), Some(Tag::INTEGER));
        assert_eq!(view.tagging(), None);
    }

    #[test]
    fn matching() {
        let schema = Schema::integer();
        let view = NodeView::new("x", &schema);
        let pos = Pos::default();
        let header = Header::new(Tag::INTEGER, false, Length::Definite(1));
        assert_eq!(view.matches(header, pos).unwrap(), true);
        let header = Header::new(Tag::BOOLEAN, false, Length::Definite(1));
        assert_eq!(view.matches(header, pos).unwrap(), false);
        // Same number, wrong class.
        let header = Header::new(Tag::ctx(2), false, Length::Definite(1));
        assert!(matches!(
            view.matches(header, pos).unwrap_err().kind(),
            ErrorKind::ClassMismatch
        ));
    }

    #[test]
    fn min_sizes() {
        let schema = Schema::sequence(vec![
            Elem::new("a", Schema::integer()),
            Elem::new("b", Schema::boolean().optional()),
            Elem::new("c", Schema::null().default(Value::Null)),
            Elem::new("d", Schema::octet_string()),
        ]);
        assert_eq!(NodeView::new("x", &schema).min_size(), 2);

        let schema = Schema::sequence_of(Schema::integer());
        assert_eq!(NodeView::new("x", &schema).min_size(), 1);
        let schema = Schema::sequence_of(Schema::integer()).min_size(0);
        assert_eq!(NodeView::new("x", &schema).min_size(), 0);
    }
}
