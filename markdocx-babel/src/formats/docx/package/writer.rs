//! Office document tree → DOCX package bytes.
//!
//! Styles, numbering, paragraphs, runs, hyperlinks, pictures and tables are assembled with
//! `docx-rs`. It has no notion of Office Math, so every formula leaves a placeholder run
//! behind and the finished package is reopened once to splice the OMML into
//! `word/document.xml`. The same pass writes the picture descriptions (alt text), which
//! `docx-rs` does not emit.

use crate::error::FormatError;
use crate::formats::docx::options::Theme;
use crate::ir::office::{
    Alignment, BodyElement, Border, ImageRun, Inline, NumberingInstance, OfficeDocument,
    Paragraph, ParagraphStyle, Table, TextRun, BULLET_NUM_ID, ORDERED_NUM_ID,
};
use crate::ir::xml::{escape_attr, XmlNode};
use docx_rs::{
    AbstractNumbering, AlignmentType, BorderType, BreakType, Docx, Hyperlink, HyperlinkType,
    IndentLevel, Level, LevelJc, LevelText, LineSpacing, NumberFormat, Numbering, NumberingId,
    ParagraphBorder, ParagraphBorderPosition, Pic, Run, RunFonts, Shading, SpecialIndentType,
    Start, Style, StyleType, WidthType,
};
use log::debug;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// English Metric Units per pixel at 96 DPI
pub const EMU_PER_PX: u32 = 9525;
/// Usable text width of a Letter page with one-inch margins, in twips
const TEXT_WIDTH_TWIPS: usize = 9360;
const ORDERED_LEVELS: usize = 8;
const BULLET_LEVELS: usize = 9;
const HEADING_SIZES: [usize; 6] = [40, 32, 28, 26, 24, 22];

const INLINE_CODE_STYLE: &str = "InlineCode";
const CODE_ACCENT: &str = "6366F1";
const QUOTE_RULE: &str = "CBD5F5";

const NS_M: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
const DOCUMENT_PART: &str = "word/document.xml";

/// Text of the placeholder run standing in for formula `index`. Private-use code points do
/// not occur in converted Markdown.
fn formula_token(index: usize) -> String {
    format!("\u{E000}omml-{index}\u{E000}")
}

/// Collects what has to be patched into the document part after `docx-rs` has packed it.
#[derive(Default)]
struct BodyBuilder {
    formulas: Vec<XmlNode>,
    image_descriptions: Vec<String>,
}

impl BodyBuilder {
    fn paragraph(&mut self, paragraph: &Paragraph) -> docx_rs::Paragraph {
        let mut para = docx_rs::Paragraph::new();

        if let Some(style) = &paragraph.style {
            para = para.style(&style.style_id());
            if let Some(border) = style_border(style) {
                para.property = para.property.set_border(border);
            }
        }
        if let Some(numbering) = &paragraph.numbering {
            para = para.numbering(
                NumberingId::new(numbering.num_id as usize),
                IndentLevel::new(usize::from(numbering.level)),
            );
        }
        if let Some(border) = &paragraph.bottom_border {
            para.property = para
                .property
                .set_border(border_edge(ParagraphBorderPosition::Bottom, border));
        }
        if let Some(spacing) = &paragraph.spacing {
            let mut line_spacing = LineSpacing::new();
            if let Some(before) = spacing.before {
                line_spacing = line_spacing.before(before);
            }
            if let Some(after) = spacing.after {
                line_spacing = line_spacing.after(after);
            }
            para = para.line_spacing(line_spacing);
        }
        if let Some(indent) = paragraph.indent_left {
            para = para.indent(Some(twips(indent)), None, None, None);
        }
        if let Some(alignment) = &paragraph.alignment {
            para = para.align(alignment_type(alignment));
        }

        for inline in &paragraph.children {
            para = match inline {
                Inline::Hyperlink { url, children } => {
                    let mut link = match url.strip_prefix('#') {
                        Some(anchor) => Hyperlink::new(anchor, HyperlinkType::Anchor),
                        None => Hyperlink::new(url, HyperlinkType::External),
                    };
                    for child in children {
                        for run in self.runs(child) {
                            link = link.add_run(run);
                        }
                    }
                    para.add_hyperlink(link)
                }
                other => self
                    .runs(other)
                    .into_iter()
                    .fold(para, |para, run| para.add_run(run)),
            };
        }

        para
    }

    /// Runs for one inline. A hyperlink nested in a hyperlink keeps its text only.
    fn runs(&mut self, inline: &Inline) -> Vec<Run> {
        match inline {
            Inline::Text(run) => vec![text_run(run)],
            Inline::Break => vec![Run::new().add_break(BreakType::TextWrapping)],
            Inline::Image(image) => vec![self.picture(image)],
            Inline::Math(omml) => {
                let token = formula_token(self.formulas.len());
                self.formulas.push(omml.clone());
                vec![Run::new().add_text(token)]
            }
            Inline::Hyperlink { children, .. } => {
                children.iter().flat_map(|child| self.runs(child)).collect()
            }
        }
    }

    fn picture(&mut self, image: &ImageRun) -> Run {
        self.image_descriptions.push(image.alt.clone());
        let pic = Pic::new(&image.png).size(
            image.width_px.saturating_mul(EMU_PER_PX),
            image.height_px.saturating_mul(EMU_PER_PX),
        );
        Run::new().add_image(pic)
    }

    fn table(&mut self, table: &Table) -> docx_rs::Table {
        let columns = table
            .rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let rows = table
            .rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells
                    .iter()
                    .map(|cell| {
                        // Percentages are expressed in fiftieths of a percent.
                        let mut docx_cell = docx_rs::TableCell::new()
                            .width(cell.width_pct as usize * 50, WidthType::Pct);
                        if let Some(fill) = &cell.shading {
                            docx_cell = docx_cell.shading(Shading::new().fill(fill));
                        }
                        if cell.paragraphs.is_empty() {
                            return docx_cell.add_paragraph(docx_rs::Paragraph::new());
                        }
                        cell.paragraphs.iter().fold(docx_cell, |docx_cell, paragraph| {
                            docx_cell.add_paragraph(self.paragraph(paragraph))
                        })
                    })
                    .collect();
                docx_rs::TableRow::new(cells)
            })
            .collect();

        docx_rs::Table::new(rows).set_grid(vec![TEXT_WIDTH_TWIPS / columns; columns])
    }
}

fn text_run(run: &TextRun) -> Run {
    let format = &run.format;
    let mut docx_run = Run::new();
    if format.code {
        docx_run = docx_run.style(INLINE_CODE_STYLE);
    }
    if format.bold {
        docx_run = docx_run.bold();
    }
    if format.italic {
        docx_run = docx_run.italic();
    }
    if format.strike {
        docx_run = docx_run.strike();
    }
    if let Some(color) = &format.color {
        docx_run = docx_run.color(color);
    }
    if format.underline {
        docx_run = docx_run.underline("single");
    }

    for (index, line) in run.text.split('\n').enumerate() {
        if index > 0 {
            docx_run = docx_run.add_break(BreakType::TextWrapping);
        }
        let mut pieces = line.split('\t').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                docx_run = docx_run.add_text(piece);
            }
            if pieces.peek().is_some() {
                docx_run = docx_run.add_tab();
            }
        }
    }
    docx_run
}

fn twips(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn alignment_type(alignment: &Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}

fn border_edge(position: ParagraphBorderPosition, border: &Border) -> ParagraphBorder {
    ParagraphBorder::new(position)
        .val(BorderType::Single)
        .size(border.size as usize)
        .space(border.space as usize)
        .color(border.color.as_str())
}

/// Accent rule drawn on the left of code blocks and block quotes.
fn style_border(style: &ParagraphStyle) -> Option<ParagraphBorder> {
    let (color, space) = match style {
        ParagraphStyle::CodeBlock => (CODE_ACCENT, 4),
        ParagraphStyle::BlockQuote => (QUOTE_RULE, 8),
        ParagraphStyle::Heading(_) => return None,
    };
    Some(border_edge(
        ParagraphBorderPosition::Left,
        &Border {
            color: color.to_string(),
            size: 12,
            space,
        },
    ))
}

fn theme_fonts(font: &str) -> RunFonts {
    RunFonts::new()
        .ascii(font)
        .hi_ansi(font)
        .east_asia(font)
        .cs(font)
}

fn add_styles(docx: Docx, theme: &Theme) -> Docx {
    let body = theme_fonts(&theme.body_font);
    let code = theme_fonts(&theme.code_font);

    let docx = HEADING_SIZES.iter().enumerate().fold(
        docx.default_fonts(body.clone()).default_size(24),
        |docx, (index, size)| {
            let level = index + 1;
            docx.add_style(
                Style::new(&format!("Heading{level}"), StyleType::Paragraph)
                    .name(&format!("heading {level}"))
                    .fonts(body.clone())
                    .size(*size)
                    .bold(),
            )
        },
    );

    docx.add_style(
        Style::new(&ParagraphStyle::CodeBlock.style_id(), StyleType::Paragraph)
            .name("Code Block")
            .fonts(code.clone())
            .size(22)
            .color("E2E8F0")
            .highlight("black")
            .indent(Some(360), None, None, None),
    )
    .add_style(
        Style::new(&ParagraphStyle::BlockQuote.style_id(), StyleType::Paragraph)
            .name("Block Quote")
            .italic()
            .color("475569")
            .indent(Some(720), None, None, None),
    )
    .add_style(
        Style::new(INLINE_CODE_STYLE, StyleType::Character)
            .name("Inline Code")
            .fonts(code)
            .size(22)
            .color("0F172A"),
    )
}

fn list_level(level: usize, format: &str, text: &str, start: usize) -> Level {
    Level::new(
        level,
        Start::new(start),
        NumberFormat::new(format),
        LevelText::new(text),
        LevelJc::new("left"),
    )
    .indent(
        Some(720 * (level as i32 + 1)),
        Some(SpecialIndentType::Hanging(360)),
        None,
        None,
    )
}

/// Decimal definition whose first level counts from `start`.
fn ordered_definition(id: usize, start: usize) -> AbstractNumbering {
    (0..ORDERED_LEVELS).fold(AbstractNumbering::new(id), |definition, level| {
        let first = if level == 0 { start } else { 1 };
        definition.add_level(list_level(
            level,
            "decimal",
            &format!("%{}.", level + 1),
            first,
        ))
    })
}

fn add_numbering(docx: Docx, instances: &[NumberingInstance]) -> Docx {
    let bullets = (0..BULLET_LEVELS).fold(
        AbstractNumbering::new(BULLET_NUM_ID as usize),
        |definition, level| definition.add_level(list_level(level, "bullet", "\u{2022}", 1)),
    );
    let ordered = ORDERED_NUM_ID as usize;

    let docx = docx
        .add_abstract_numbering(bullets)
        .add_numbering(Numbering::new(BULLET_NUM_ID as usize, BULLET_NUM_ID as usize))
        .add_abstract_numbering(ordered_definition(ordered, 1))
        .add_numbering(Numbering::new(ordered, ordered));

    // A list starting elsewhere than 1 gets a definition of its own.
    instances.iter().fold(docx, |docx, instance| {
        let id = instance.num_id as usize;
        docx.add_abstract_numbering(ordered_definition(id, instance.start as usize))
            .add_numbering(Numbering::new(id, id))
    })
}

/// Replace each formula's placeholder run with its OMML and declare the math namespace on
/// the document root.
fn splice_formulas(mut xml: String, formulas: &[XmlNode]) -> Result<String, FormatError> {
    const RUN_END: &str = "</w:r>";

    for (index, omml) in formulas.iter().enumerate() {
        let missing = || {
            FormatError::SerializationError(format!(
                "placeholder run for formula {index} not found in {DOCUMENT_PART}"
            ))
        };
        let at = xml.find(&formula_token(index)).ok_or_else(missing)?;
        let start = [xml[..at].rfind("<w:r>"), xml[..at].rfind("<w:r ")]
            .into_iter()
            .flatten()
            .max()
            .ok_or_else(missing)?;
        let end = xml[at..]
            .find(RUN_END)
            .map(|offset| at + offset + RUN_END.len())
            .ok_or_else(missing)?;
        xml.replace_range(start..end, &omml.to_xml_string());
    }

    if let Some(root) = xml.find("<w:document") {
        let tag_end = xml[root..].find('>').map_or(xml.len(), |offset| root + offset);
        if !xml[root..tag_end].contains("xmlns:m=") {
            xml.insert_str(root + "<w:document".len(), &format!(r#" xmlns:m="{NS_M}""#));
        }
    }
    Ok(xml)
}

/// Give the n-th `wp:docPr` the n-th picture description, replacing any `descr` present.
fn describe_images(xml: String, descriptions: &[String]) -> String {
    const DOC_PR: &str = "<wp:docPr";

    let mut out = String::with_capacity(xml.len());
    let mut rest = xml.as_str();
    let mut descriptions = descriptions.iter();
    while let Some(at) = rest.find(DOC_PR) {
        let tag_start = at + DOC_PR.len();
        let tag_end = rest[tag_start..]
            .find('>')
            .map_or(rest.len(), |offset| tag_start + offset);
        out.push_str(&rest[..tag_start]);
        let attributes = &rest[tag_start..tag_end];
        match descriptions.next() {
            Some(descr) => {
                out.push_str(&format!(r#" descr="{}""#, escape_attr(descr)));
                out.push_str(&strip_attribute(attributes, "descr"));
            }
            None => out.push_str(attributes),
        }
        rest = &rest[tag_end..];
    }
    out.push_str(rest);
    out
}

fn strip_attribute(attributes: &str, name: &str) -> String {
    let needle = format!(" {name}=\"");
    match attributes.find(&needle) {
        Some(start) => {
            let value_start = start + needle.len();
            let end = attributes[value_start..]
                .find('"')
                .map_or(attributes.len(), |offset| value_start + offset + 1);
            format!("{}{}", &attributes[..start], &attributes[end..])
        }
        None => attributes.to_string(),
    }
}

/// Rewrite the document part of a packed archive, copying every other entry unchanged.
fn patch_document(
    packed: &[u8],
    patch: impl FnOnce(String) -> Result<String, FormatError>,
) -> Result<Vec<u8>, FormatError> {
    let zip_error = |e: zip::result::ZipError| {
        FormatError::SerializationError(format!("Failed to rewrite package: {e}"))
    };
    let io_error = |e: std::io::Error| {
        FormatError::SerializationError(format!("Failed to rewrite package: {e}"))
    };

    let mut archive = ZipArchive::new(Cursor::new(packed)).map_err(zip_error)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut patch = Some(patch);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(io_error)?;

        if name == DOCUMENT_PART {
            if let Some(patch) = patch.take() {
                let xml = String::from_utf8(data).map_err(|e| {
                    FormatError::SerializationError(format!("{DOCUMENT_PART} is not UTF-8: {e}"))
                })?;
                data = patch(xml)?.into_bytes();
            }
        }

        writer.start_file(name.as_str(), options).map_err(zip_error)?;
        writer.write_all(&data).map_err(io_error)?;
    }

    Ok(writer.finish().map_err(zip_error)?.into_inner())
}

/// Serialize an Office document into DOCX package bytes.
pub fn write_package(doc: &OfficeDocument, theme: &Theme) -> Result<Vec<u8>, FormatError> {
    let mut builder = BodyBuilder::default();
    let docx = add_numbering(add_styles(Docx::new(), theme), &doc.numbering);
    let docx = doc.body.iter().fold(docx, |docx, element| match element {
        BodyElement::Paragraph(paragraph) => docx.add_paragraph(builder.paragraph(paragraph)),
        BodyElement::Table(table) => docx.add_table(builder.table(table)),
    });

    let mut packed = Vec::new();
    docx.build()
        .pack(&mut Cursor::new(&mut packed))
        .map_err(|e| FormatError::SerializationError(format!("Failed to pack DOCX: {e}")))?;

    let BodyBuilder {
        formulas,
        image_descriptions,
    } = builder;
    debug!(
        "Packed DOCX with {} formulas and {} pictures",
        formulas.len(),
        image_descriptions.len()
    );
    if formulas.is_empty() && image_descriptions.is_empty() {
        return Ok(packed);
    }

    patch_document(&packed, |xml| {
        let xml = splice_formulas(xml, &formulas)?;
        Ok(describe_images(xml, &image_descriptions))
    })
}
