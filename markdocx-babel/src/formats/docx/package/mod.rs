//! DOCX package plumbing: writing, reading and checking the ZIP container.

pub mod reader;
pub mod validate;
pub mod writer;

pub use reader::PackageReader;
pub use validate::{integrity_issues, validate_package};
pub use writer::write_package;
