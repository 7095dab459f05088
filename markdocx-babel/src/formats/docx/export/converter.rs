//! Markdown node tree → Office document tree.
//!
//! One method per node kind. Block conversion threads a [`BlockContext`] (list depth, list
//! kind, block-quote flag) downward; inline conversion threads the inherited [`RunFormat`]
//! so nested emphasis composes instead of flattening. Nothing here fails: a node that cannot
//! be converted (an image that will not load, a formula the translator rejects) degrades to
//! literal text.

use super::images::{load_image, ImageFetcher};
use crate::common::converted::Converted;
use crate::formats::docx::options::ExportOptions;
use crate::ir::nodes::{ColumnAlignment, MdNode};
use crate::ir::office::{
    Alignment, BodyElement, Border, Inline, NumberingInstance, NumberingRef, OfficeDocument,
    Paragraph, ParagraphStyle, RunFormat, Spacing, Table, TableCell, TableRow, BULLET_NUM_ID,
    ORDERED_NUM_ID,
};
use crate::math::translate_formula;
use log::{debug, warn};

pub const LINK_COLOR: &str = "2563EB";
pub const RULE_COLOR: &str = "CBD5F5";
pub const HEADER_SHADING: &str = "EEF2FF";

/// Twips of indentation per list level
const LIST_INDENT: u32 = 720;
/// Deepest level declared by the bullet definition
const MAX_BULLET_LEVEL: u8 = 8;
/// Deepest level declared by the ordered-list definition
const MAX_ORDERED_LEVEL: u8 = 7;

#[derive(Debug, Clone, Copy, Default)]
struct BlockContext {
    list_depth: u8,
    block_quote: bool,
    /// Numbering instance for the innermost list, `None` outside lists
    list_num_id: Option<u32>,
}

impl BlockContext {
    fn paragraph_style(&self) -> Option<ParagraphStyle> {
        self.block_quote.then_some(ParagraphStyle::BlockQuote)
    }
}

/// Converts one Markdown document. Owns the per-call numbering instance table.
pub struct ForwardConverter<'a> {
    options: &'a ExportOptions,
    fetcher: &'a dyn ImageFetcher,
    numbering: Vec<NumberingInstance>,
}

impl<'a> ForwardConverter<'a> {
    pub fn new(options: &'a ExportOptions, fetcher: &'a dyn ImageFetcher) -> Self {
        ForwardConverter {
            options,
            fetcher,
            numbering: Vec::new(),
        }
    }

    /// Convert a parsed document into the Office tree.
    pub fn convert_document(mut self, root: &MdNode) -> OfficeDocument {
        let mut body = self.convert_blocks(root.children(), BlockContext::default());
        if body.is_empty() {
            body.push(BodyElement::Paragraph(Paragraph::default()));
        }
        debug!("Converted Markdown into {} body elements", body.len());
        OfficeDocument {
            body,
            numbering: self.numbering,
        }
    }

    fn convert_blocks(&mut self, nodes: &[MdNode], context: BlockContext) -> Vec<BodyElement> {
        nodes
            .iter()
            .flat_map(|node| self.convert_block(node, context))
            .collect()
    }

    fn convert_block(&mut self, node: &MdNode, context: BlockContext) -> Vec<BodyElement> {
        match node {
            MdNode::Paragraph { children } => {
                let paragraph = Paragraph {
                    style: context.paragraph_style(),
                    children: self.convert_inlines(children, &RunFormat::default()),
                    ..Default::default()
                };
                vec![BodyElement::Paragraph(paragraph)]
            }

            MdNode::Heading { depth, children } => {
                let paragraph = Paragraph {
                    style: Some(ParagraphStyle::Heading((*depth).clamp(1, 6))),
                    spacing: Some(Spacing::new(240, 120)),
                    children: self.convert_inlines(children, &RunFormat::default()),
                    ..Default::default()
                };
                vec![BodyElement::Paragraph(paragraph)]
            }

            MdNode::ThematicBreak => {
                let paragraph = Paragraph {
                    bottom_border: Some(Border {
                        color: RULE_COLOR.to_string(),
                        size: 12,
                        space: 60,
                    }),
                    spacing: Some(Spacing::new(240, 240)),
                    ..Default::default()
                };
                vec![BodyElement::Paragraph(paragraph)]
            }

            MdNode::BlockQuote { children } => {
                let quoted = BlockContext {
                    block_quote: true,
                    ..context
                };
                self.convert_blocks(children, quoted)
            }

            MdNode::CodeBlock { value, .. } => {
                vec![BodyElement::Paragraph(convert_code(value))]
            }

            MdNode::List { .. } => self.convert_list(node, context),

            MdNode::MathBlock { value } => {
                vec![BodyElement::Paragraph(convert_math_block(value))]
            }

            MdNode::Table { .. } => vec![BodyElement::Table(self.convert_table(node))],

            MdNode::Html { value } => {
                let paragraph = Paragraph {
                    style: context.paragraph_style(),
                    children: vec![Inline::plain(value.clone())],
                    ..Default::default()
                };
                vec![BodyElement::Paragraph(paragraph)]
            }

            MdNode::Document { children }
            | MdNode::ListItem { children, .. }
            | MdNode::TableRow { children }
            | MdNode::TableCell { children } => self.convert_blocks(children, context),

            inline => {
                let paragraph = Paragraph {
                    style: context.paragraph_style(),
                    children: self.convert_inlines(std::slice::from_ref(inline), &RunFormat::default()),
                    ..Default::default()
                };
                vec![BodyElement::Paragraph(paragraph)]
            }
        }
    }

    fn convert_list(&mut self, node: &MdNode, context: BlockContext) -> Vec<BodyElement> {
        let MdNode::List {
            ordered,
            start,
            children,
        } = node
        else {
            return Vec::new();
        };

        let num_id = match (*ordered, *start) {
            (false, _) => BULLET_NUM_ID,
            (true, 1) => ORDERED_NUM_ID,
            (true, start) => self.start_override(start),
        };

        // A list met inside another list's item (directly or through a quote) sits one
        // level deeper than that item.
        let list_depth = match context.list_num_id {
            Some(_) => context.list_depth.saturating_add(1),
            None => context.list_depth,
        };
        let list_context = BlockContext {
            list_depth,
            list_num_id: Some(num_id),
            ..context
        };

        children
            .iter()
            .flat_map(|item| self.convert_list_item(item, list_context))
            .collect()
    }

    /// Register a numbering instance restarting the ordered list at `start`.
    fn start_override(&mut self, start: usize) -> u32 {
        let num_id = ORDERED_NUM_ID + 1 + self.numbering.len() as u32;
        self.numbering.push(NumberingInstance {
            num_id,
            start: u32::try_from(start).unwrap_or(u32::MAX),
        });
        num_id
    }

    fn convert_list_item(&mut self, item: &MdNode, context: BlockContext) -> Vec<BodyElement> {
        let (checked, children) = match item {
            MdNode::ListItem { checked, children } => (*checked, children.as_slice()),
            other => (None, std::slice::from_ref(other)),
        };

        let numbering = context.list_num_id.map(|num_id| {
            let max_level = if num_id == BULLET_NUM_ID {
                MAX_BULLET_LEVEL
            } else {
                MAX_ORDERED_LEVEL
            };
            NumberingRef {
                num_id,
                level: context.list_depth.min(max_level),
            }
        });

        let mut elements = Vec::new();
        let mut has_main_paragraph = false;

        for child in children {
            match child {
                MdNode::Paragraph { children } if !has_main_paragraph => {
                    let mut inlines = Vec::new();
                    if let Some(checked) = checked {
                        inlines.push(Inline::plain(if checked { "[x] " } else { "[ ] " }));
                    }
                    inlines.extend(self.convert_inlines(children, &RunFormat::default()));
                    elements.push(BodyElement::Paragraph(Paragraph {
                        style: context.paragraph_style(),
                        numbering,
                        children: inlines,
                        ..Default::default()
                    }));
                    has_main_paragraph = true;
                }
                MdNode::Paragraph { children } => {
                    elements.push(BodyElement::Paragraph(Paragraph {
                        style: context.paragraph_style(),
                        indent_left: Some(LIST_INDENT * (u32::from(context.list_depth) + 1)),
                        children: self.convert_inlines(children, &RunFormat::default()),
                        ..Default::default()
                    }));
                }
                other => elements.extend(self.convert_block(other, context)),
            }
        }

        if !has_main_paragraph {
            let mut inlines = Vec::new();
            if let Some(checked) = checked {
                inlines.push(Inline::plain(if checked { "[x] " } else { "[ ] " }));
            }
            elements.insert(
                0,
                BodyElement::Paragraph(Paragraph {
                    style: context.paragraph_style(),
                    numbering,
                    children: inlines,
                    ..Default::default()
                }),
            );
        }

        elements
    }

    fn convert_table(&mut self, node: &MdNode) -> Table {
        let MdNode::Table {
            alignments,
            children,
        } = node
        else {
            return Table::default();
        };

        let rows = children
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                let header = row_index == 0;
                let cells = row.children();
                let width_pct = 100 / cells.len().max(1) as u32;

                let cells = cells
                    .iter()
                    .enumerate()
                    .map(|(cell_index, cell)| {
                        let alignment = match alignments.get(cell_index) {
                            Some(ColumnAlignment::Center) => Alignment::Center,
                            Some(ColumnAlignment::Right) => Alignment::Right,
                            _ => Alignment::Left,
                        };
                        let paragraph = Paragraph {
                            alignment: Some(alignment),
                            children: self.convert_inlines(cell.children(), &RunFormat::default()),
                            ..Default::default()
                        };
                        TableCell {
                            paragraphs: vec![paragraph],
                            width_pct,
                            shading: header.then(|| HEADER_SHADING.to_string()),
                        }
                    })
                    .collect();

                TableRow { cells }
            })
            .collect();

        Table { rows }
    }

    fn convert_inlines(&mut self, nodes: &[MdNode], format: &RunFormat) -> Vec<Inline> {
        let mut runs = Vec::new();
        for node in nodes {
            self.convert_inline(node, format, &mut runs);
        }
        runs
    }

    fn convert_inline(&mut self, node: &MdNode, format: &RunFormat, runs: &mut Vec<Inline>) {
        match node {
            MdNode::Text { value } => runs.push(Inline::text(value.clone(), format)),

            MdNode::Strong { children } => {
                let format = RunFormat {
                    bold: true,
                    ..format.clone()
                };
                runs.extend(self.convert_inlines(children, &format));
            }

            MdNode::Emphasis { children } => {
                let format = RunFormat {
                    italic: true,
                    ..format.clone()
                };
                runs.extend(self.convert_inlines(children, &format));
            }

            MdNode::Strikethrough { children } => {
                let format = RunFormat {
                    strike: true,
                    ..format.clone()
                };
                runs.extend(self.convert_inlines(children, &format));
            }

            MdNode::InlineCode { value } => {
                let format = RunFormat {
                    code: true,
                    ..format.clone()
                };
                runs.push(Inline::text(value.clone(), &format));
            }

            MdNode::LineBreak => runs.push(Inline::Break),

            MdNode::Link { url, children } => {
                let format = RunFormat {
                    color: Some(LINK_COLOR.to_string()),
                    underline: true,
                    ..format.clone()
                };
                let children = self.convert_inlines(children, &format);
                if url.is_empty() {
                    runs.extend(children);
                } else {
                    runs.push(Inline::Hyperlink {
                        url: url.clone(),
                        children,
                    });
                }
            }

            MdNode::Image { url, alt } => {
                match load_image(self.fetcher, url, alt, &self.options.images) {
                    Ok(image) => runs.push(Inline::Image(image)),
                    Err(err) => {
                        warn!("Could not embed image '{url}': {err}");
                        runs.push(Inline::plain(format!("![{alt}]({url})")));
                    }
                }
            }

            MdNode::InlineMath { value } => runs.push(math_inline(value, false)),

            MdNode::MathBlock { value } => runs.push(math_inline(value, true)),

            MdNode::Html { value } => runs.push(Inline::text(value.clone(), format)),

            other => {
                let children = other.children();
                if !children.is_empty() {
                    runs.extend(self.convert_inlines(children, format));
                } else {
                    let text = other.text_content();
                    if !text.is_empty() {
                        runs.push(Inline::text(text, format));
                    }
                }
            }
        }
    }
}

fn math_inline(latex: &str, display: bool) -> Inline {
    match translate_formula(latex, display) {
        Converted::Value(omml) => Inline::Math(omml),
        Converted::Fallback(text) => Inline::plain(text),
    }
}

fn convert_code(value: &str) -> Paragraph {
    let mut children = Vec::new();
    for (index, line) in value.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if index > 0 {
            children.push(Inline::Break);
        }
        children.push(Inline::plain(if line.is_empty() { " " } else { line }));
    }

    Paragraph {
        style: Some(ParagraphStyle::CodeBlock),
        children,
        ..Default::default()
    }
}

fn convert_math_block(latex: &str) -> Paragraph {
    match translate_formula(latex, true) {
        Converted::Value(omml) => Paragraph {
            alignment: Some(Alignment::Center),
            spacing: Some(Spacing::new(180, 180)),
            children: vec![Inline::Math(omml)],
            ..Default::default()
        },
        Converted::Fallback(text) => Paragraph::with_children(vec![Inline::plain(text)]),
    }
}
