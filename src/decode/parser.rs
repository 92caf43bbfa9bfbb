//! The schema-driven decoder.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.
//!
//! Decoding is a recursive descent over the schema tree with the input
//! cursor threaded through. Each visit of a node reads the value's header,
//! checks it against the node's expectation, unwraps a schema-level tag if
//! there is one, and then runs the strategy for the node's codec. A visit
//! that fails leaves the cursor exactly where it found it, so enclosing
//! contexts can treat an optional value as absent or try the next choice
//! alternative.

use bytes::Bytes;
use crate::schema::{Codec, Elem, Schema, Tagging};
use crate::value::{ChoiceValue, List, Record, Value};
use super::any::{skip_indefinite, take_any};
use super::error::{DecodeError, ErrorKind, Pos};
use super::header::{Header, Length};
use super::leaf::{decode_leaf, is_string_type};
use super::source::{Source, SourceState};
use super::view::NodeView;


/// How deeply schemas may nest before we give up on them.
const MAX_DEPTH: usize = 64;

/// The name decoded values are stored under at the root.
const ROOT_NAME: &str = "value";


//------------ Schema::decode ------------------------------------------------

impl Schema {
    /// Decodes one complete value from the given data.
    ///
    /// The data must contain exactly the encoding of one value of this
    /// schema. Left-over octets after the value are an error, as is an
    /// absent value unless the schema declares a default, in which case
    /// empty input yields that default.
    pub fn decode(
        &self, data: impl Into<Bytes>,
    ) -> Result<Value, DecodeError> {
        let mut source = Source::new(data.into());
        let view = NodeView::new(ROOT_NAME, self);
        let mut parser = Parser { depth: 0 };
        match parser.decode_node(&mut source, &view)? {
            Parsed::Value(value) => {
                if !source.is_exhausted() {
                    return Err(DecodeError::new(
                        ErrorKind::LengthMismatch, source.pos(),
                    ))
                }
                Ok(value)
            }
            Parsed::Skipped => {
                match self.default_value() {
                    Some(value) => Ok(value.clone()),
                    None => Err(view.missing(None, source.pos())),
                }
            }
        }
    }
}


//------------ Parsed --------------------------------------------------------

/// The outcome of visiting one schema node.
#[derive(Debug)]
enum Parsed {
    /// A value was decoded; the cursor sits right behind it.
    Value(Value),

    /// The node was absent; the cursor has not moved.
    Skipped,
}


/// Unwraps the value a tag rewrite committed to.
///
/// Once an envelope tag has been matched the value inside has to be
/// there; its absence no longer means "skip me" but broken data.
fn unwrap_inner(
    res: Result<Parsed, DecodeError>, pos: Pos, msg: &'static str,
) -> Result<Value, DecodeError> {
    match res? {
        Parsed::Value(value) => Ok(value),
        Parsed::Skipped => {
            Err(DecodeError::new(ErrorKind::Malformed(msg), pos))
        }
    }
}


//------------ Parser --------------------------------------------------------

/// The state of one top-level decode call.
struct Parser {
    /// The current recursion depth.
    depth: usize,
}

impl Parser {
    /// Visits one schema node.
    ///
    /// This wraps the actual work with the two guarantees every caller
    /// relies on: the cursor is rewound whenever no value is produced,
    /// and a merely-absent kind of failure on a node that tolerates
    /// absence turns into a skip instead of an error.
    fn decode_node(
        &mut self, source: &mut Source, view: &NodeView,
    ) -> Result<Parsed, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(
                DecodeError::new(ErrorKind::TooDeep, source.pos())
            )
        }
        self.depth += 1;
        let start = source.state();
        let res = self.decode_node_inner(source, view);
        self.depth -= 1;
        match res {
            Ok(Parsed::Value(value)) => Ok(Parsed::Value(value)),
            Ok(Parsed::Skipped) => {
                source.restore(start);
                Ok(Parsed::Skipped)
            }
            Err(err) => {
                source.restore(start);
                if err.is_soft() && view.is_skippable() {
                    Ok(Parsed::Skipped)
                }
                else {
                    Err(err)
                }
            }
        }
    }

    fn decode_node_inner(
        &mut self, source: &mut Source, view: &NodeView,
    ) -> Result<Parsed, DecodeError> {
        let start = source.state();
        let pos = source.pos();
        if source.is_exhausted() {
            return Err(view.missing(None, pos))
        }
        let header = Header::take_from(source)?;
        if !view.matches(header, pos)? {
            return Err(view.missing(Some(header.tag()), pos))
        }
        match view.tagging() {
            Some(Tagging::Explicit) => {
                self.decode_explicit(source, view, header, pos)
            }
            Some(Tagging::Implicit) => {
                self.decode_implicit(source, view, header, pos, start)
            }
            None => self.dispatch(source, view, header, pos, start),
        }
    }

    /// Runs the decoding strategy of the node's codec.
    ///
    /// The header of the value has been read and matched. Codecs that
    /// need to read it themselves get the cursor rewound to `start`.
    fn dispatch(
        &mut self, source: &mut Source, view: &NodeView, header: Header,
        pos: Pos, start: SourceState,
    ) -> Result<Parsed, DecodeError> {
        match *view.codec() {
            Codec::Primitive(_) => {
                self.decode_primitive(source, header, pos)
                    .map(Parsed::Value)
            }
            Codec::Constructive(_, ref fields) => {
                self.decode_constructive(source, view, fields, header, pos)
            }
            Codec::SequenceOf(ref elem) | Codec::SetOf(ref elem) => {
                self.decode_of(source, view, elem, header, pos)
            }
            Codec::Template(ref inner) => {
                source.restore(start);
                self.decode_node(
                    source, &NodeView::new(view.name(), inner)
                )
            }
            Codec::Choice(ref alternatives) => {
                source.restore(start);
                self.decode_choice(source, view, alternatives, pos)
            }
            Codec::Any => {
                source.restore(start);
                self.decode_any(source, view, pos)
            }
        }
    }

    /// Peels an explicit envelope and decodes the single value inside.
    fn decode_explicit(
        &mut self, source: &mut Source, view: &NodeView, header: Header,
        pos: Pos,
    ) -> Result<Parsed, DecodeError> {
        if !header.constructed() {
            return Err(DecodeError::new(
                ErrorKind::Malformed(
                    "primitive encoding of an explicitly tagged value"
                ),
                pos,
            ))
        }
        let inner_view = NodeView::untagged(view.name(), view.schema());
        match header.length() {
            Length::Definite(len) => {
                let old = source.limit_to(len)?;
                let res = self.decode_node(source, &inner_view);
                let value = unwrap_inner(
                    res, pos, "invalid content of an explicitly tagged value",
                )?;
                if !source.is_exhausted() {
                    return Err(DecodeError::new(
                        ErrorKind::Malformed(
                            "multiple values in an explicitly tagged value"
                        ),
                        source.pos(),
                    ))
                }
                source.unlimit(old);
                Ok(Parsed::Value(value))
            }
            Length::Indefinite => {
                let res = self.decode_node(source, &inner_view);
                let value = unwrap_inner(
                    res, pos, "invalid content of an explicitly tagged value",
                )?;
                self.take_eoc(
                    source, pos,
                    "multiple values in an explicitly tagged value",
                )?;
                Ok(Parsed::Value(value))
            }
        }
    }

    /// Rebuilds an implicitly tagged value and decodes the result.
    ///
    /// The wire carries the schema tag where the natural tag of the
    /// codec would normally be. The content is copied into a fresh buffer
    /// behind a synthetic header carrying the natural tag again, and the
    /// node is decoded from that buffer as if it were untagged. Only the
    /// class and number are rewritten; the constructed bit is kept from
    /// the wire so the codec still gets to validate it.
    fn decode_implicit(
        &mut self, source: &mut Source, view: &NodeView, header: Header,
        pos: Pos, start: SourceState,
    ) -> Result<Parsed, DecodeError> {
        let natural = match *view.codec() {
            // An ANY has no natural tag to restore; the raw value is
            // simply captured as it is, schema tag included.
            Codec::Any => {
                source.restore(start);
                return self.decode_any(source, view, pos)
            }
            Codec::Choice(_) => {
                return Err(DecodeError::new(
                    ErrorKind::Unimplemented("implicitly tagged CHOICE"),
                    pos,
                ))
            }
            _ => match view.natural_tag() {
                Some(tag) => tag,
                None => {
                    return Err(DecodeError::new(
                        ErrorKind::Unimplemented(
                            "implicit tagging without a natural tag"
                        ),
                        pos,
                    ))
                }
            }
        };
        let mut buf = Vec::new();
        match header.length() {
            Length::Definite(len) => {
                let content = source.take_bytes(len)?;
                Header::write_into(
                    natural, header.constructed(), len, &mut buf
                );
                buf.extend_from_slice(content.as_ref());
            }
            Length::Indefinite => {
                let content_start = source.state();
                skip_indefinite(source)?;
                let content = source.bytes_since(content_start);
                natural.write_into(true, &mut buf);
                buf.push(0x80);
                buf.extend_from_slice(content.as_ref());
            }
        }
        let mut inner = Source::with_offset(
            buf.into(), pos.into_usize()
        );
        let inner_view = NodeView::untagged(view.name(), view.schema());
        let res = self.decode_node(&mut inner, &inner_view);
        let value = unwrap_inner(
            res, pos, "invalid content of an implicitly tagged value",
        )?;
        if !inner.is_exhausted() {
            return Err(DecodeError::new(
                ErrorKind::Malformed(
                    "trailing octets in an implicitly tagged value"
                ),
                inner.pos(),
            ))
        }
        Ok(Parsed::Value(value))
    }

    /// Decodes a primitive value whose header has been read.
    fn decode_primitive(
        &mut self, source: &mut Source, header: Header, pos: Pos,
    ) -> Result<Value, DecodeError> {
        if header.constructed() {
            return Err(if is_string_type(header.tag()) {
                DecodeError::new(
                    ErrorKind::Unimplemented(
                        "fragmented string encoding"
                    ),
                    pos,
                )
            }
            else {
                DecodeError::new(
                    ErrorKind::Malformed(
                        "constructed encoding of a primitive value"
                    ),
                    pos,
                )
            })
        }
        let len = match header.length() {
            Length::Definite(len) => len,
            Length::Indefinite => {
                return Err(DecodeError::new(
                    ErrorKind::InvalidIndefiniteLength, pos,
                ))
            }
        };
        let content = source.take_bytes(len)?;
        decode_leaf(header.tag(), content, pos)
    }

    /// Decodes the fields of a SEQUENCE or SET in declaration order.
    fn decode_constructive(
        &mut self, source: &mut Source, view: &NodeView, fields: &[Elem],
        header: Header, pos: Pos,
    ) -> Result<Parsed, DecodeError> {
        if !header.constructed() {
            return Err(DecodeError::new(
                ErrorKind::Malformed(
                    "primitive encoding of a constructed value"
                ),
                pos,
            ))
        }
        let mut record = Record::new();
        let indefinite = header.length() == Length::Indefinite;
        let old_limit = match header.length() {
            Length::Definite(len) => Some(source.limit_to(len)?),
            Length::Indefinite => {
                record.set_indefinite();
                None
            }
        };
        let mut matched = 0;
        for elem in fields {
            let child = NodeView::new(elem.name(), elem.schema());
            if self.content_exhausted(source, indefinite) {
                // The remaining fields get their defaults; whether any
                // of them was mandatory is the minimum count's business.
                if let Some(default) = child.default_value() {
                    record.push(elem.name(), default.clone());
                }
                continue
            }
            match self.decode_node(source, &child)? {
                Parsed::Value(value) => {
                    record.push(elem.name(), value);
                    matched += 1;
                }
                Parsed::Skipped => {
                    if let Some(default) = child.default_value() {
                        record.push(elem.name(), default.clone());
                    }
                }
            }
        }
        if matched < view.min_size() {
            return Err(
                DecodeError::new(ErrorKind::TooFewElements, pos)
            )
        }
        if indefinite {
            self.take_eoc(
                source, pos, "unexpected element in a constructed value",
            )?;
        }
        else {
            if !source.is_exhausted() {
                return Err(DecodeError::new(
                    ErrorKind::Malformed(
                        "unexpected element in a constructed value"
                    ),
                    source.pos(),
                ))
            }
            if let Some(old) = old_limit {
                source.unlimit(old);
            }
        }
        Ok(Parsed::Value(Value::Record(record)))
    }

    /// Decodes the homogeneous elements of a SEQUENCE OF or SET OF.
    fn decode_of(
        &mut self, source: &mut Source, view: &NodeView, elem: &Schema,
        header: Header, pos: Pos,
    ) -> Result<Parsed, DecodeError> {
        if !header.constructed() {
            return Err(DecodeError::new(
                ErrorKind::Malformed(
                    "primitive encoding of a constructed value"
                ),
                pos,
            ))
        }
        let mut list = List::new();
        let indefinite = header.length() == Length::Indefinite;
        let old_limit = match header.length() {
            Length::Definite(len) => Some(source.limit_to(len)?),
            Length::Indefinite => {
                list.set_indefinite();
                None
            }
        };
        while !self.content_exhausted(source, indefinite) {
            // Every element gets a fresh view of the element schema.
            let item = NodeView::new("item", elem);
            match self.decode_node(source, &item) {
                Ok(Parsed::Value(value)) => list.push(value),
                Ok(Parsed::Skipped) => break,
                Err(err) if err.is_soft() => {
                    return Err(DecodeError::new(
                        ErrorKind::Malformed(
                            "mismatched element in a collection"
                        ),
                        err.pos(),
                    ))
                }
                Err(err) => return Err(err),
            }
        }
        if list.len() < view.min_size() {
            // A collection below its minimum is broken, with one
            // exception: a field tolerating absence also tolerates
            // emptiness and keeps the empty collection.
            if !(list.is_empty() && view.is_skippable()) {
                return Err(
                    DecodeError::new(ErrorKind::TooFewElements, pos)
                )
            }
        }
        if indefinite {
            self.take_eoc(
                source, pos, "mismatched element in a collection",
            )?;
        }
        else {
            if !source.is_exhausted() {
                return Err(DecodeError::new(
                    ErrorKind::Malformed(
                        "mismatched element in a collection"
                    ),
                    source.pos(),
                ))
            }
            if let Some(old) = old_limit {
                source.unlimit(old);
            }
        }
        Ok(Parsed::Value(Value::List(list)))
    }

    /// Selects and decodes the alternative of a CHOICE.
    ///
    /// The cursor sits at the start of the value. Alternatives are
    /// scanned in declared order by their effective tag; an untagged ANY
    /// alternative never matches by tag but serves as the fallback when
    /// nothing else fit.
    fn decode_choice(
        &mut self, source: &mut Source, view: &NodeView,
        alternatives: &[Schema], pos: Pos,
    ) -> Result<Parsed, DecodeError> {
        let state = source.state();
        let header = Header::take_from(source)?;
        source.restore(state);
        let mut selected = None;
        for (index, alt) in alternatives.iter().enumerate() {
            let wire = match NodeView::new(view.name(), alt).wire_tag() {
                Some(tag) => tag,
                None => continue,
            };
            if wire.number() == header.tag().number()
                && wire.class() == header.tag().class()
            {
                selected = Some(index);
                break
            }
        }
        if selected.is_none() {
            selected = alternatives.iter().position(|alt| {
                matches!(alt.codec(), Codec::Any) && alt.tag().is_none()
            });
        }
        let index = match selected {
            Some(index) => index,
            None => return Err(view.missing(Some(header.tag()), pos)),
        };
        let alt_view = NodeView::new(view.name(), &alternatives[index]);
        let value = match self.decode_node(source, &alt_view)? {
            Parsed::Value(value) => value,
            Parsed::Skipped => {
                return Err(view.missing(Some(header.tag()), pos))
            }
        };
        Ok(Parsed::Value(Value::Choice(Box::new(
            ChoiceValue::new(index, header.tag(), value)
        ))))
    }

    /// Captures a raw value for an ANY node.
    ///
    /// The cursor sits at the start of the value; any schema-level tag
    /// has already been matched against its header.
    fn decode_any(
        &mut self, source: &mut Source, view: &NodeView, pos: Pos,
    ) -> Result<Parsed, DecodeError> {
        if view.is_skippable() && view.wire_tag().is_none() {
            return Err(
                DecodeError::new(ErrorKind::AmbiguousAny, pos)
            )
        }
        Ok(Parsed::Value(Value::Any(take_any(source)?)))
    }

    /// Returns whether the content of a constructed value has ended.
    ///
    /// For the definite length form that is the end of the length
    /// budget; for the indefinite form, an immediately following
    /// end-of-contents marker, which is left unconsumed.
    fn content_exhausted(
        &self, source: &mut Source, indefinite: bool,
    ) -> bool {
        if !indefinite {
            return source.is_exhausted()
        }
        if source.is_exhausted() {
            return true
        }
        let state = source.state();
        let pos = source.pos();
        let res = Header::take_from(source).and_then(|header| {
            header.is_eoc(pos)
        });
        source.restore(state);
        matches!(res, Ok(true))
    }

    /// Consumes the end-of-contents closing an indefinite length value.
    ///
    /// An exhausted source means the construction was never closed; any
    /// other value in its place is reported with the given message.
    fn take_eoc(
        &self, source: &mut Source, pos: Pos, msg: &'static str,
    ) -> Result<(), DecodeError> {
        if source.is_exhausted() {
            return Err(DecodeError::new(ErrorKind::MissingEoc, pos))
        }
        let eoc_pos = source.pos();
        let header = Header::take_from(source)?;
        if header.is_eoc(eoc_pos)? {
            Ok(())
        }
        else {
            Err(DecodeError::new(ErrorKind::Malformed(msg), eoc_pos))
        }
    }
}


//============ Tests =========================================================
