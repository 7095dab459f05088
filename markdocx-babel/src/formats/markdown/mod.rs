//! Markdown format implementation
//!
//! Markdown is the hub representation of this crate, so the Markdown format itself is thin:
//! parsing decodes the source bytes and normalises line endings, serializing runs the math
//! notation normalizer. The node tree used by the DOCX exporter is produced by [`parser`].
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown parsing. This choice is based on:
//! - CommonMark compliance with the GFM extensions we need (tables, strikethrough, task lists)
//! - Native dollar-math support (`$...$`, `$$...$$`)
//! - Robust and well-maintained
//!
//! # Element Mapping Table
//!
//! Complete Markdown ↔ DOCX Mapping:
//!
//! | Markdown          | DOCX Equivalent                  | Export Notes                         | Import Notes                          |
//! |-------------------|----------------------------------|--------------------------------------|---------------------------------------|
//! | Heading (# .. ######) | `Heading1`..`Heading6` style | Depth → style                        | Style id, style outline, direct outline |
//! | Paragraph         | Paragraph                        | Direct mapping                       | Direct mapping                        |
//! | List (- / 1.)     | Numbered paragraphs              | Bullets numId 1, ordered numId 2+    | Marker from numbering definitions     |
//! | Task item         | `[x] ` / `[ ] ` text prefix      | Literal prefix run                   | Prefix unescaped                      |
//! | Block quote       | `BlockQuote` style               | Applied to all nested blocks         | `> ` prefix                           |
//! | Code block (```)  | `CodeBlock` style                | One paragraph, lines split by breaks | Consecutive code paragraphs merged    |
//! | Table             | Table                            | Header row shaded, uniform widths    | Row 0 is the header                   |
//! | Thematic break    | Bottom-bordered paragraph        | Empty paragraph with border          | Empty bordered paragraph → `---`      |
//! | InlineContent:    |                                  |                                      |                                       |
//! |   Strong / Emphasis / ~~Strike~~ | Run properties    | Nested formats compose               | Direct                                |
//! |   `code`          | Inline code run                  | Monospace character style            | Doubled backticks when needed         |
//! |   Link            | Hyperlink                        | Coloured and underlined              | Relationship / anchor / field         |
//! |   Image           | Inline drawing                   | Fetched, size clamped                | Embedded as data URL                  |
//! |   $math$          | OMML `m:oMath`                   | LaTeX → MathML → OMML                | OMML → LaTeX                          |
//! | $$math$$          | Centred `m:oMathPara` paragraph  | Falls back to literal `$$...$$`      | `$$` block                            |
//!
//! # Lossy Conversions
//!
//! The following conversions lose information on round-trip:
//! - Code block language tags (DOCX has no place to keep them)
//! - Column alignment of tables without header cell justification
//! - Raw HTML → plain text
//! - Remote images become embedded images
//! - Multiple blank lines → single blank line (Markdown normalization)

pub mod normalize;
pub mod parser;

use crate::error::FormatError;
use crate::format::Format;

pub use normalize::normalize_math;
pub use parser::parse_markdown;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM extensions and dollar math"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8]) -> Result<String, FormatError> {
        let text = std::str::from_utf8(source)
            .map_err(|e| FormatError::ParseError(format!("Markdown is not valid UTF-8: {e}")))?;
        Ok(text.replace("\r\n", "\n"))
    }

    fn serialize(&self, markdown: &str) -> Result<String, FormatError> {
        Ok(normalize_math(markdown))
    }
}
