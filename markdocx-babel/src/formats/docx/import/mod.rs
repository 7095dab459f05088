//! DOCX → Markdown import.
//!
//! `word/document.xml` is required; the relationships, numbering and styles parts are
//! optional and degrade to empty tables when absent or unreadable.

pub mod converter;
pub mod images;
pub mod inline;
pub mod numbering;
pub mod relationships;
pub mod styles;

pub use converter::{render_blocks, Block, BlockKind, ReverseConverter};
pub use relationships::Relationships;

use crate::error::FormatError;
use crate::formats::docx::options::ImportOptions;
use crate::formats::docx::package::PackageReader;
use crate::ir::xml::parse_xml;
use images::ImageResolver;
use log::{debug, info, warn};
use numbering::NumberingTable;
use styles::StyleTable;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const STYLES_PART: &str = "word/styles.xml";

fn open_package(bytes: &[u8]) -> Result<PackageReader<'_>, FormatError> {
    PackageReader::open(bytes)
        .map_err(|e| FormatError::ParseError(format!("Failed to open DOCX archive: {e}")))
}

/// An optional part's text. A part that cannot be read or decoded counts as absent.
fn read_optional(package: &mut PackageReader<'_>, part: &str) -> Option<String> {
    match package.read_text(part) {
        Ok(text) => text,
        Err(e) => {
            warn!("Ignoring unreadable {part}: {e}");
            None
        }
    }
}

/// Convert DOCX bytes into Markdown text.
pub fn import_docx(bytes: &[u8], options: &ImportOptions) -> Result<String, FormatError> {
    let mut package = open_package(bytes)?;
    let document = package
        .read_text(DOCUMENT_PART)?
        .ok_or_else(|| FormatError::MissingPart(DOCUMENT_PART.to_string()))?;

    let relationships =
        Relationships::parse(read_optional(&mut package, RELATIONSHIPS_PART).as_deref());
    let numbering = NumberingTable::parse(read_optional(&mut package, NUMBERING_PART).as_deref());
    let styles = StyleTable::parse(read_optional(&mut package, STYLES_PART).as_deref());
    debug!(
        "Read DOCX package: {} relationships",
        relationships.len()
    );

    let root = parse_xml(&document)?;
    let body = root
        .child("body")
        .ok_or_else(|| FormatError::ParseError("The DOCX document has no body".to_string()))?;

    let mut converter = ReverseConverter::new(
        relationships,
        numbering,
        styles,
        ImageResolver::new(package),
        *options,
    );
    let blocks = converter.convert_body(body);
    let markdown = render_blocks(&blocks);

    info!(
        "Imported {} byte DOCX into {} blocks of Markdown",
        bytes.len(),
        blocks.len()
    );
    Ok(markdown)
}

/// Part names and the relationship table of a package, for inspection.
pub fn describe_package(bytes: &[u8]) -> Result<String, FormatError> {
    let mut package = open_package(bytes)?;
    let mut out = String::from("Parts:\n");
    for name in package.part_names() {
        out.push_str(&format!("  {name}\n"));
    }

    let relationships = Relationships::parse(package.read_text(RELATIONSHIPS_PART)?.as_deref());
    out.push_str("Relationships:\n");
    for (id, rel) in relationships.sorted() {
        let kind = rel.kind.rsplit('/').next().unwrap_or(&rel.kind);
        let mode = if rel.external { " (external)" } else { "" };
        out.push_str(&format!("  {id} {kind} -> {}{mode}\n", rel.target));
    }
    Ok(out)
}
