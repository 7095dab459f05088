//! Markdown format tests: parsing into the node tree and the math notation normalizer.

mod normalize;
mod parse;
