//! The value, statement and fragment types that the procedural builder produces and consumes.
//!
//! These are intentionally minimal: the builder only needs widths, boolean reduction, constant casting,
//! concatenation and equality on values, and the set of written signals on statements.

pub mod fragment;
pub mod print;
pub mod statement;
pub mod value;
