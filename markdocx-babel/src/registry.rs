//! Format registry for format discovery and selection
//!
//! Formats are looked up by name or by file extension. Since every format speaks Markdown,
//! a conversion between any two registered formats is a parse followed by a serialize.

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use log::debug;
use std::collections::HashMap;

/// Registry of document formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
///
/// let markdown = registry.parse(&docx_bytes, "docx")?;
/// let package = registry.convert(markdown.as_bytes(), "markdown", "docx", &no_options, &export_options)?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format of the same name
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Format whose extensions include the file name's extension, compared
    /// case-insensitively (`REPORT.DOCX` resolves to `docx`).
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    pub fn parse(&self, source: &[u8], format: &str) -> Result<String, FormatError> {
        self.parse_with_options(source, format, &HashMap::new())
    }

    /// Parse source bytes into Markdown
    pub fn parse_with_options(
        &self,
        source: &[u8],
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse_with_options(source, options)
    }

    /// Serialize Markdown, expecting text output
    pub fn serialize(&self, markdown: &str, format: &str) -> Result<String, FormatError> {
        match self.serialize_with_options(markdown, format, &HashMap::new())? {
            SerializedDocument::Text(text) => Ok(text),
            SerializedDocument::Binary(_) => Err(FormatError::SerializationError(format!(
                "Format '{format}' produced binary output when text was expected"
            ))),
        }
    }

    pub fn serialize_with_options(
        &self,
        markdown: &str,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(markdown, options)
    }

    /// Convert `source` from one registered format to another through Markdown.
    ///
    /// Both formats are resolved before any parsing happens, so a misspelt target fails
    /// without touching the input.
    pub fn convert(
        &self,
        source: &[u8],
        from: &str,
        to: &str,
        parse_options: &HashMap<String, String>,
        serialize_options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.get(from)?;
        self.get(to)?;
        let markdown = self.parse_with_options(source, from, parse_options)?;
        debug!("parsed {} bytes of {from} into {} bytes of Markdown", source.len(), markdown.len());
        self.serialize_with_options(&markdown, to, serialize_options)
    }

    /// Registry with the Markdown and DOCX formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::formats::markdown::MarkdownFormat);
        registry.register(crate::formats::docx::DocxFormat::default());
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
