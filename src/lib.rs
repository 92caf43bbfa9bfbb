//! Schema-driven decoding of data encoded in BER and DER.
//!
//! This crate decodes data encoded according to the Basic Encoding Rules
//! of ASN.1 or their stricter DER variant, driven by a schema describing
//! the expected shape of the data: the order and types of fields, their
//! tagging, which of them may be absent, and what to store in their place
//! if they are.
//!
//! A schema is built once through the methods of the [`Schema`] type and
//! can then decode any number of inputs. Decoding produces a tree of
//! [`Value`]s mirroring the schema:
//!
//! ```
//! use tber::{Elem, Schema};
//!
//! let schema = Schema::sequence(vec![
//!     Elem::new("serial", Schema::integer()),
//!     Elem::new("critical", Schema::boolean().default(false.into())),
//! ]);
//!
//! let value = schema.decode(&b"\x30\x03\x02\x01\x07"[..]).unwrap();
//! let record = value.as_record().unwrap();
//! assert_eq!(
//!     record.get("serial").unwrap().as_integer().unwrap().to_i128(),
//!     Some(7)
//! );
//! assert_eq!(record.get("critical").unwrap().as_bool(), Some(false));
//! ```
//!
//! The decoder understands both the definite and the indefinite length
//! form, IMPLICIT and EXPLICIT tagging, CHOICE with wildcard fallback,
//! and open-ended ANY slots captured raw. It is lenient the way BER
//! demands; it does not enforce the additional restrictions of DER.
//! Encoding values back into bytes is not supported.

pub mod decode;

pub use self::decode::{DecodeError, ErrorKind, Pos};
pub use self::int::Integer;
pub use self::oid::Oid;
pub use self::schema::{Codec, Elem, Schema, Tagging};
pub use self::tag::{Class, Tag};
pub use self::value::{
    AnyValue, BitString, ChoiceValue, List, Record, Time, Value
};

mod int;
mod oid;
mod schema;
mod tag;
mod value;
