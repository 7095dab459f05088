//! Markdown node model produced by the Markdown parser and consumed by the forward converter.

use serde::Serialize;

/// A parsed Markdown node.
///
/// Block and inline kinds share one closed type so that converters can dispatch with an
/// exhaustive `match`. Nodes are built once per export call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MdNode {
    Document {
        children: Vec<MdNode>,
    },
    Paragraph {
        children: Vec<MdNode>,
    },
    Heading {
        depth: u8,
        children: Vec<MdNode>,
    },
    List {
        ordered: bool,
        start: usize,
        children: Vec<MdNode>,
    },
    ListItem {
        checked: Option<bool>,
        children: Vec<MdNode>,
    },
    BlockQuote {
        children: Vec<MdNode>,
    },
    CodeBlock {
        lang: Option<String>,
        value: String,
    },
    Table {
        alignments: Vec<ColumnAlignment>,
        children: Vec<MdNode>,
    },
    TableRow {
        children: Vec<MdNode>,
    },
    TableCell {
        children: Vec<MdNode>,
    },
    ThematicBreak,
    /// Raw HTML, block or inline
    Html {
        value: String,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<MdNode>,
    },
    Strong {
        children: Vec<MdNode>,
    },
    Strikethrough {
        children: Vec<MdNode>,
    },
    InlineCode {
        value: String,
    },
    Link {
        url: String,
        children: Vec<MdNode>,
    },
    Image {
        url: String,
        alt: String,
    },
    LineBreak,
    InlineMath {
        value: String,
    },
    MathBlock {
        value: String,
    },
}

/// Column alignment declared in a table's delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

impl MdNode {
    /// Child nodes, empty for leaf kinds.
    pub fn children(&self) -> &[MdNode] {
        match self {
            MdNode::Document { children }
            | MdNode::Paragraph { children }
            | MdNode::Heading { children, .. }
            | MdNode::List { children, .. }
            | MdNode::ListItem { children, .. }
            | MdNode::BlockQuote { children }
            | MdNode::Table { children, .. }
            | MdNode::TableRow { children }
            | MdNode::TableCell { children }
            | MdNode::Emphasis { children }
            | MdNode::Strong { children }
            | MdNode::Strikethrough { children }
            | MdNode::Link { children, .. } => children,
            MdNode::CodeBlock { .. }
            | MdNode::ThematicBreak
            | MdNode::Html { .. }
            | MdNode::Text { .. }
            | MdNode::InlineCode { .. }
            | MdNode::Image { .. }
            | MdNode::LineBreak
            | MdNode::InlineMath { .. }
            | MdNode::MathBlock { .. } => &[],
        }
    }

    /// Plain text content of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MdNode::Text { value }
            | MdNode::InlineCode { value }
            | MdNode::Html { value }
            | MdNode::CodeBlock { value, .. } => out.push_str(value),
            MdNode::InlineMath { value } | MdNode::MathBlock { value } => out.push_str(value),
            MdNode::Image { alt, .. } => out.push_str(alt),
            MdNode::LineBreak => out.push(' '),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}
