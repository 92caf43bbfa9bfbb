//! Decoding data from its encoded form.
//!
//! The module itself only surfaces the error types; all decoding happens
//! through [`Schema::decode`][crate::Schema::decode] which walks the
//! encoded data driven by the schema tree.

pub use self::error::{DecodeError, ErrorKind, Pos};
pub(crate) use self::source::Source;

mod any;
mod error;
mod header;
mod leaf;
mod parser;
mod source;
mod view;
