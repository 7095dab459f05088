//! Format-agnostic helpers shared by the converters.

pub mod converted;
pub mod numbering;
