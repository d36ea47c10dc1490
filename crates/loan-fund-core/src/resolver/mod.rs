//! Ordered-candidate field resolution over loosely-typed result payloads.
//!
//! Every logical fact is declared once as a [`FieldPath`]: an ordered list of
//! dotted locations where producers have historically written it. Resolution
//! returns the first location holding a non-null value. A present `0`,
//! `false` or `""` wins over later candidates; nothing is ever defaulted here.

pub mod path;
pub mod reader;
pub mod value;

pub use path::{lookup, resolve, FieldPath};
pub use reader::{FactReader, UnresolvedFact, UnresolvedReason};
pub use value::{
    as_bool, as_count, as_decimal, as_string, resolve_bool, resolve_count, resolve_decimal,
    resolve_string,
};
