//! Markdown → DOCX export pipeline.
//!
//! normalize (optional) → parse → convert → write package → integrity check. The package is
//! only returned when the check passes.

pub mod converter;
pub mod images;

pub use converter::ForwardConverter;
pub use images::{FetchedImage, ImageFetcher, SourceFetcher};

use crate::error::FormatError;
use crate::formats::docx::options::ExportOptions;
use crate::formats::docx::package::{validate_package, write_package};
use crate::formats::markdown::{normalize_math, parse_markdown};
use log::{error, info};

/// Convert Markdown text into DOCX bytes.
pub fn export_markdown(
    markdown: &str,
    options: &ExportOptions,
    fetcher: &dyn ImageFetcher,
) -> Result<Vec<u8>, FormatError> {
    let source = if options.normalize_math {
        normalize_math(markdown)
    } else {
        markdown.replace("\r\n", "\n")
    };

    let tree = parse_markdown(&source);
    let document = ForwardConverter::new(options, fetcher).convert_document(&tree);
    let bytes = write_package(&document, &options.theme)?;

    if let Err(err) = validate_package(&bytes) {
        error!("Generated DOCX failed the integrity check: {err}");
        return Err(err);
    }

    info!(
        "Exported {} bytes of Markdown into a {} byte DOCX",
        markdown.len(),
        bytes.len()
    );
    Ok(bytes)
}
