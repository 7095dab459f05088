//! Document body → Markdown blocks.
//!
//! The body is walked once in document order. Consecutive code-styled paragraphs collect in
//! a buffer and are flushed as one fenced block by the next non-code element; list counters
//! live for the whole walk and are reset by every block that interrupts a list run. An
//! indented paragraph right after a list item continues that item and keeps the counters.

use super::images::ImageResolver;
use super::inline::plain_text;
use super::numbering::NumberingTable;
use super::relationships::Relationships;
use super::styles::StyleTable;
use crate::common::numbering::{ListCounters, ListInfo};
use crate::formats::docx::options::ImportOptions;
use crate::ir::xml::XmlNode;
use crate::math::omml_to_latex;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)heading(\d)").expect("valid heading style regex"));
static TASK_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\\[([ xX])\\\] ").expect("valid task prefix regex"));

/// Twips of indentation per list level, as Word and the exporter lay lists out
const LIST_INDENT_TWIPS: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    /// A further paragraph of the list item above it
    ListContinuation,
    BlockQuote,
    Table,
    Code,
    Math,
    Rule,
}

/// One rendered Markdown block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: String,
}

impl Block {
    fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Block {
            kind,
            content: content.into(),
        }
    }
}

enum ParagraphOutcome {
    Block(Block),
    /// A line for the pending code block
    Code(String),
    Skip,
}

/// How a paragraph's properties classify it
#[derive(Debug, Default)]
struct ParagraphProps {
    code: bool,
    block_quote: bool,
    heading: Option<u32>,
    list: Option<ListInfo>,
    bottom_border: bool,
    indent_left: u32,
}

/// State for one import call
pub struct ReverseConverter<'a> {
    pub(super) relationships: Relationships,
    pub(super) numbering: NumberingTable,
    pub(super) styles: StyleTable,
    pub(super) images: ImageResolver<'a>,
    pub(super) options: ImportOptions,
    /// Set while converting a table cell, where a bare `|` would end the cell
    pub(super) in_table_cell: bool,
}

impl<'a> ReverseConverter<'a> {
    pub fn new(
        relationships: Relationships,
        numbering: NumberingTable,
        styles: StyleTable,
        images: ImageResolver<'a>,
        options: ImportOptions,
    ) -> Self {
        ReverseConverter {
            relationships,
            numbering,
            styles,
            images,
            options,
            in_table_cell: false,
        }
    }

    /// Convert the children of `w:body` into blocks.
    pub fn convert_body(&mut self, body: &XmlNode) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut code_lines: Vec<String> = Vec::new();
        let mut counters = ListCounters::new();

        for node in body_elements(body.children()) {
            match node.local_name() {
                "p" => match self.convert_paragraph(node, &mut counters) {
                    ParagraphOutcome::Code(line) => code_lines.push(line),
                    ParagraphOutcome::Skip => {
                        flush_code(&mut code_lines, &mut blocks);
                        counters.reset();
                    }
                    ParagraphOutcome::Block(block) => {
                        flush_code(&mut code_lines, &mut blocks);
                        if !matches!(block.kind, BlockKind::List | BlockKind::ListContinuation) {
                            counters.reset();
                        }
                        blocks.push(block);
                    }
                },
                "tbl" => {
                    flush_code(&mut code_lines, &mut blocks);
                    counters.reset();
                    if let Some(table) = self.convert_table(node) {
                        blocks.push(table);
                    }
                }
                _ => {}
            }
        }
        flush_code(&mut code_lines, &mut blocks);

        debug!("Converted document body into {} blocks", blocks.len());
        blocks
    }

    fn paragraph_props(&self, paragraph: &XmlNode) -> ParagraphProps {
        let mut props = ParagraphProps::default();
        let Some(ppr) = paragraph.child("pPr") else {
            return props;
        };

        let style_id = ppr.child("pStyle").and_then(|s| s.attr("val"));
        if let Some(id) = style_id {
            let lower = id.to_lowercase();
            let name = self
                .styles
                .get(id)
                .and_then(|style| style.name.as_deref())
                .map(str::to_lowercase)
                .unwrap_or_default();
            props.code = lower.contains("code") || lower.contains("monospace");
            props.block_quote = ["quote", "cita"]
                .iter()
                .any(|word| lower.contains(word) || name.contains(word));
        }
        props.heading = self.heading_level(style_id, ppr);

        if let Some(num_pr) = ppr.child("numPr") {
            let level = num_pr
                .child("ilvl")
                .and_then(|l| l.attr("val"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
            props.list = num_pr
                .child("numId")
                .and_then(|n| n.attr("val"))
                .and_then(|num_id| self.numbering.resolve(num_id, level));
        }

        props.bottom_border = ppr
            .child("pBdr")
            .and_then(|border| border.child("bottom"))
            .is_some();
        props.indent_left = ppr
            .child("ind")
            .and_then(|ind| ind.attr("left").or_else(|| ind.attr("start")))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        props
    }

    /// Style id pattern, then the style's outline level, then a direct outline level.
    fn heading_level(&self, style_id: Option<&str>, ppr: &XmlNode) -> Option<u32> {
        if let Some(id) = style_id {
            if let Some(level) = HEADING_STYLE
                .captures(id)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
            {
                return Some(level);
            }
            if let Some(outline) = self.styles.get(id).and_then(|s| s.outline_level) {
                return Some(outline + 1);
            }
        }
        ppr.child("outlineLvl")
            .and_then(|o| o.attr("val"))
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|outline| outline + 1)
    }

    fn convert_paragraph(
        &mut self,
        paragraph: &XmlNode,
        counters: &mut ListCounters,
    ) -> ParagraphOutcome {
        let props = self.paragraph_props(paragraph);
        let content = paragraph.children();

        if props.code {
            let text = plain_text(content);
            if text.trim().is_empty() {
                return ParagraphOutcome::Skip;
            }
            return ParagraphOutcome::Code(text);
        }

        if props.list.is_none() && props.heading.is_none() {
            if let Some(math) = display_math(paragraph) {
                return ParagraphOutcome::Block(Block::new(BlockKind::Math, math));
            }
        }

        let inline = self.convert_inline(content, false);
        let inline = inline.trim();

        if let Some(level) = props.heading {
            let hashes = "#".repeat(level.clamp(1, 6) as usize);
            let line = format!("{hashes} {inline}");
            return ParagraphOutcome::Block(Block::new(BlockKind::Heading, line.trim()));
        }

        if let Some(info) = &props.list {
            if inline.is_empty() {
                return ParagraphOutcome::Skip;
            }
            let text = TASK_PREFIX.replace(inline, "[$1] ");
            let line = counters.render_line(info, &text);
            return ParagraphOutcome::Block(Block::new(BlockKind::List, line));
        }

        if inline.is_empty() {
            if props.bottom_border {
                return ParagraphOutcome::Block(Block::new(BlockKind::Rule, "---"));
            }
            return ParagraphOutcome::Skip;
        }

        if props.indent_left > 0 && !props.block_quote {
            let level = (props.indent_left / LIST_INDENT_TWIPS).saturating_sub(1) as usize;
            if let Some(column) = counters.continuation_column(level) {
                let pad = " ".repeat(column);
                let lines: Vec<String> = inline
                    .split('\n')
                    .map(|line| format!("{pad}{line}"))
                    .collect();
                return ParagraphOutcome::Block(Block::new(
                    BlockKind::ListContinuation,
                    lines.join("\n"),
                ));
            }
        }

        if props.block_quote {
            let quoted: Vec<String> = inline
                .split('\n')
                .map(|line| format!("> {line}").trim_end().to_string())
                .collect();
            return ParagraphOutcome::Block(Block::new(BlockKind::BlockQuote, quoted.join("\n")));
        }

        ParagraphOutcome::Block(Block::new(BlockKind::Paragraph, inline))
    }

    fn convert_table(&mut self, table: &XmlNode) -> Option<Block> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut alignments: Vec<&'static str> = Vec::new();

        for row in table.children_named("tr") {
            let cells: Vec<&XmlNode> = row.children_named("tc").collect();
            if cells.is_empty() {
                continue;
            }
            if rows.is_empty() {
                alignments = cells.iter().map(|cell| cell_alignment(cell)).collect();
            }
            let converted = cells
                .iter()
                .map(|cell| self.convert_cell(cell))
                .collect();
            rows.push(converted);
        }

        let columns = rows.iter().map(Vec::len).max()?;
        for row in &mut rows {
            row.resize(columns, String::new());
        }
        alignments.resize(columns, "---");

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(table_line(&rows[0]));
        lines.push(format!("| {} |", alignments.join(" | ")));
        lines.extend(rows[1..].iter().map(|row| table_line(row)));
        Some(Block::new(BlockKind::Table, lines.join("\n")))
    }

    fn convert_cell(&mut self, cell: &XmlNode) -> String {
        self.in_table_cell = true;
        let parts: Vec<String> = cell
            .children_named("p")
            .map(|paragraph| self.convert_inline(paragraph.children(), false).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        self.in_table_cell = false;
        parts.join("<br>")
    }
}

/// Body children with block-level content controls unwrapped
fn body_elements(nodes: &[XmlNode]) -> Vec<&XmlNode> {
    let mut elements = Vec::new();
    for node in nodes {
        if node.is("sdt") {
            if let Some(content) = node.child("sdtContent") {
                elements.extend(body_elements(content.children()));
            }
        } else {
            elements.push(node);
        }
    }
    elements
}

fn flush_code(lines: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let body = lines.join("\n");
    lines.clear();
    let longest_run = body
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    blocks.push(Block::new(BlockKind::Code, format!("{fence}\n{body}\n{fence}")));
}

/// `$$` block for a paragraph that holds display formulas and no other visible text
fn display_math(paragraph: &XmlNode) -> Option<String> {
    let mut formulas = Vec::new();
    collect_display_math(paragraph, &mut formulas);
    if formulas.is_empty() || has_visible_text(paragraph) {
        return None;
    }
    let latex: Vec<String> = formulas
        .into_iter()
        .map(|formula| omml_to_latex(formula))
        .filter(|latex| !latex.is_empty())
        .collect();
    if latex.is_empty() {
        return None;
    }
    Some(format!("$$\n{}\n$$", latex.join("\n")))
}

fn collect_display_math<'n>(node: &'n XmlNode, found: &mut Vec<&'n XmlNode>) {
    if node.is("oMathPara") {
        found.push(node);
        return;
    }
    for child in node.children() {
        collect_display_math(child, found);
    }
}

fn has_visible_text(node: &XmlNode) -> bool {
    match node {
        XmlNode::Text(text) => !text.trim().is_empty(),
        XmlNode::Element { .. } => match node.local_name() {
            "oMathPara" | "pPr" => false,
            "t" | "r" | "instrText" => !node.text().trim().is_empty(),
            _ => node.children().iter().any(has_visible_text),
        },
    }
}

fn cell_alignment(cell: &XmlNode) -> &'static str {
    let justification = cell
        .child("p")
        .and_then(|p| p.child("pPr"))
        .and_then(|ppr| ppr.child("jc"))
        .and_then(|jc| jc.attr("val"));
    match justification {
        Some("center") => ":---:",
        Some("right") | Some("end") => "---:",
        _ => "---",
    }
}

fn table_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Join blocks with one blank line; consecutive list lines stay adjacent.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut previous: Option<BlockKind> = None;
    for block in blocks {
        match previous {
            None => {}
            Some(BlockKind::List) if block.kind == BlockKind::List => out.push('\n'),
            Some(_) => out.push_str("\n\n"),
        }
        out.push_str(&block.content);
        previous = Some(block.kind);
    }
    out.trim_end().to_string()
}
