//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement.
//! Markdown text is the hub representation: every format parses its source into Markdown and
//! serializes Markdown into its own representation.

use crate::error::FormatError;
use std::collections::HashMap;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., markdown)
    Text(String),
    /// Binary output (e.g., docx)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// Trait for document formats
///
/// Implementors provide conversion between their source representation and Markdown text.
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_parsing(&self) -> bool {
///         true
///     }
///
///     fn parse(&self, source: &[u8]) -> Result<String, FormatError> {
///         // Turn source bytes into Markdown
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "markdown", "docx")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["docx"], ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → Markdown)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Markdown → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Whether serialization yields [`SerializedDocument::Binary`]. Callers use this to
    /// demand an output path before doing any work.
    fn binary_output(&self) -> bool {
        false
    }

    /// Parse source bytes into Markdown text
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &[u8]) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Parse source bytes, optionally using extra parameters.
    ///
    /// The default implementation ignores an empty option map and rejects anything else.
    fn parse_with_options(
        &self,
        source: &[u8],
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.parse(source)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }

    /// Serialize Markdown text into this format's text representation
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _markdown: &str) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize Markdown text, optionally using extra parameters.
    ///
    /// Formats that only emit textual output can rely on the default implementation,
    /// which delegates to [`Format::serialize`]. Binary formats should override this
    /// method to return [`SerializedDocument::Binary`].
    fn serialize_with_options(
        &self,
        markdown: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        if options.is_empty() {
            self.serialize(markdown).map(SerializedDocument::Text)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}
