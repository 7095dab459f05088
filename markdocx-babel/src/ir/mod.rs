//! Intermediate representations shared by the converters.
//!
//! - [`nodes`]: the Markdown node tree produced by the Markdown parser.
//! - [`office`]: the Office document object tree emitted by the forward converter.
//! - [`xml`]: the generic XML tree the reverse converter and the math translator walk.

pub mod nodes;
pub mod office;
pub mod xml;
