//! DOCX (Office Open XML word-processing package) support.
//!
//! Export: Markdown → node tree → Office tree → package bytes, checked before they are
//! returned. Import: package bytes → Markdown, with list numbering, formulas, tables and
//! embedded images reconstructed.
//!
//! Layout:
//!
//!     docx
//!     ├── options.rs      # typed export/import options built from `--extra-*` maps
//!     ├── export          # forward converter and image loading
//!     ├── package         # ZIP writer, reader and integrity check
//!     └── import          # reverse converter and the package tables it consults

pub mod export;
pub mod import;
pub mod options;
pub mod package;

pub use export::{export_markdown, ImageFetcher, SourceFetcher};
pub use import::{describe_package, import_docx};
pub use options::{ExportOptions, ImageOptions, ImportOptions, Theme};

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use std::collections::HashMap;

/// Binary DOCX format. Parsing imports a package, serialization exports one.
#[derive(Default)]
pub struct DocxFormat {
    fetcher: Option<Box<dyn ImageFetcher + Send + Sync>>,
}

impl DocxFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom image source instead of the one built from the export options.
    pub fn with_fetcher(fetcher: impl ImageFetcher + Send + Sync + 'static) -> Self {
        DocxFormat {
            fetcher: Some(Box::new(fetcher)),
        }
    }
}

impl Format for DocxFormat {
    fn name(&self) -> &str {
        "docx"
    }

    fn description(&self) -> &str {
        "Office Open XML word-processing document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn binary_output(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8]) -> Result<String, FormatError> {
        import_docx(source, &ImportOptions::default())
    }

    fn parse_with_options(
        &self,
        source: &[u8],
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        import_docx(source, &ImportOptions::from_options(options)?)
    }

    fn serialize(&self, _markdown: &str) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(
            "DOCX serialization produces binary output".to_string(),
        ))
    }

    fn serialize_with_options(
        &self,
        markdown: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let options = ExportOptions::from_options(options)?;
        let bytes = match &self.fetcher {
            Some(fetcher) => export_markdown(markdown, &options, fetcher.as_ref())?,
            None => export_markdown(markdown, &options, &SourceFetcher::new(&options.images))?,
        };
        Ok(SerializedDocument::Binary(bytes))
    }
}

/// Append `.docx` to a file name that does not already end with it.
pub fn ensure_docx_extension(file_name: &str) -> String {
    let trimmed = file_name.trim();
    let base = if trimmed.is_empty() { "document" } else { trimmed };
    if base.to_ascii_lowercase().ends_with(".docx") {
        base.to_string()
    } else {
        format!("{base}.docx")
    }
}
