//! Format implementations
//!
//! Markdown text is the hub: every format parses into it and serializes out of it.

pub mod docx;
pub mod markdown;

pub use docx::DocxFormat;
pub use markdown::MarkdownFormat;
