//! Office document object tree.
//!
//! Built by the forward converter from the Markdown node tree and consumed immediately by the
//! package builder. Only the properties the converters actually produce are modelled: named
//! paragraph styles, numbering references, spacing, indentation, borders, shading and a small
//! set of run formatting flags.

use crate::ir::xml::XmlNode;

/// Numbering definition id used for bulleted lists. Id 1 is left to the package builder's
/// own default list.
pub const BULLET_NUM_ID: u32 = 2;
/// Numbering definition id shared by ordered lists starting at 1.
pub const ORDERED_NUM_ID: u32 = 3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OfficeDocument {
    pub body: Vec<BodyElement>,
    /// Extra ordered-list instances that restart numbering at a custom value.
    pub numbering: Vec<NumberingInstance>,
}

/// An ordered list that does not count from 1. It gets a numbering definition of its own
/// (same id for the definition and the instance) whose first level starts at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub start: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Heading level 1 to 6
    Heading(u8),
    CodeBlock,
    BlockQuote,
}

impl ParagraphStyle {
    /// Style id as declared in `styles.xml`.
    pub fn style_id(&self) -> String {
        match self {
            ParagraphStyle::Heading(level) => format!("Heading{level}"),
            ParagraphStyle::CodeBlock => "CodeBlock".to_string(),
            ParagraphStyle::BlockQuote => "BlockQuote".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Paragraph spacing in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
}

impl Spacing {
    pub fn new(before: u32, after: u32) -> Self {
        Spacing {
            before: Some(before),
            after: Some(after),
        }
    }
}

/// A single border edge. Size is in eighths of a point, space in points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub color: String,
    pub size: u32,
    pub space: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub style: Option<ParagraphStyle>,
    pub numbering: Option<NumberingRef>,
    pub bottom_border: Option<Border>,
    pub spacing: Option<Spacing>,
    /// Left indentation in twips
    pub indent_left: Option<u32>,
    pub alignment: Option<Alignment>,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn with_children(children: Vec<Inline>) -> Self {
        Paragraph {
            children,
            ..Default::default()
        }
    }

    /// Whether the paragraph carries no visible inline content.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(TextRun),
    Break,
    Hyperlink { url: String, children: Vec<Inline> },
    Image(ImageRun),
    /// A translated OMML fragment (`m:oMath` or `m:oMathPara`), embedded as-is
    Math(XmlNode),
}

impl Inline {
    pub fn text(text: impl Into<String>, format: &RunFormat) -> Self {
        Inline::Text(TextRun {
            text: text.into(),
            format: format.clone(),
        })
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Inline::text(text, &RunFormat::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub format: RunFormat,
}

/// Inherited inline formatting, applied when a leaf run is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub color: Option<String>,
    /// Rendered with the inline-code character style
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRun {
    /// Bitmap re-encoded as PNG, the only picture encoding the package builder embeds
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    /// Cell width as a percentage of the table width
    pub width_pct: u32,
    pub shading: Option<String>,
}
