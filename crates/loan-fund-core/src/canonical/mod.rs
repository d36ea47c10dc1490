//! Canonical result builder.
//!
//! Folds a loosely-typed simulation payload into one [`CanonicalResult`]
//! whose field names do not depend on the producer version.

pub mod builder;
pub mod fields;
mod monte_carlo;
pub mod model;

pub use builder::{build_canonical, build_canonical_with};
pub use model::*;
