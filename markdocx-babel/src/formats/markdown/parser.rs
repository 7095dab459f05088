//! Markdown parsing (Markdown → node tree)
//!
//! Converts CommonMark Markdown (with GFM tables, strikethrough, autolinks, task lists and
//! dollar math) into the [`MdNode`] tree consumed by the DOCX exporter.
//! Pipeline: Markdown string → Comrak AST → MdNode tree

use crate::ir::nodes::{ColumnAlignment, MdNode};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

/// Parse a Markdown string into a node tree
///
/// Parsing is total: any input produces a document node.
pub fn parse_markdown(source: &str) -> MdNode {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);
    convert_node(root).unwrap_or(MdNode::Document { children: vec![] })
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.math_dollars = true;
    options
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<MdNode> {
    node.children().filter_map(convert_node).collect()
}

/// Convert one Comrak node, returning `None` for kinds with no counterpart
fn convert_node<'a>(node: &'a AstNode<'a>) -> Option<MdNode> {
    let data = node.data.borrow();

    let converted = match &data.value {
        NodeValue::Document => MdNode::Document {
            children: convert_children(node),
        },

        NodeValue::Paragraph => {
            let children = convert_children(node);
            match sole_display_math(&children) {
                Some(value) => MdNode::MathBlock { value },
                None => MdNode::Paragraph { children },
            }
        }

        NodeValue::Heading(heading) => MdNode::Heading {
            depth: heading.level,
            children: convert_children(node),
        },

        NodeValue::List(list) => MdNode::List {
            ordered: matches!(list.list_type, ListType::Ordered),
            start: list.start,
            children: convert_children(node),
        },

        NodeValue::Item(_) => MdNode::ListItem {
            checked: None,
            children: convert_children(node),
        },

        NodeValue::TaskItem(mark) => MdNode::ListItem {
            checked: Some(mark.is_some_and(|c| c != ' ')),
            children: convert_children(node),
        },

        NodeValue::BlockQuote => MdNode::BlockQuote {
            children: convert_children(node),
        },

        NodeValue::CodeBlock(code_block) => {
            let lang = code_block.info.split_whitespace().next().map(str::to_string);
            let value = code_block
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code_block.literal)
                .to_string();
            if lang.as_deref() == Some("math") {
                MdNode::MathBlock { value }
            } else {
                MdNode::CodeBlock { lang, value }
            }
        }

        NodeValue::HtmlBlock(html) => MdNode::Html {
            value: html.literal.trim_end_matches('\n').to_string(),
        },

        NodeValue::ThematicBreak => MdNode::ThematicBreak,

        NodeValue::Table(table) => MdNode::Table {
            alignments: table.alignments.iter().map(column_alignment).collect(),
            children: convert_children(node),
        },

        NodeValue::TableRow(_) => MdNode::TableRow {
            children: convert_children(node),
        },

        NodeValue::TableCell => MdNode::TableCell {
            children: convert_children(node),
        },

        NodeValue::Text(text) => MdNode::Text {
            value: text.clone(),
        },

        NodeValue::SoftBreak => MdNode::Text {
            value: " ".to_string(),
        },

        NodeValue::LineBreak => MdNode::LineBreak,

        NodeValue::Emph => MdNode::Emphasis {
            children: convert_children(node),
        },

        NodeValue::Strong => MdNode::Strong {
            children: convert_children(node),
        },

        NodeValue::Strikethrough => MdNode::Strikethrough {
            children: convert_children(node),
        },

        NodeValue::Code(code) => MdNode::InlineCode {
            value: code.literal.clone(),
        },

        NodeValue::HtmlInline(html) => MdNode::Html {
            value: html.clone(),
        },

        NodeValue::Link(link) => MdNode::Link {
            url: link.url.clone(),
            children: convert_children(node),
        },

        NodeValue::Image(link) => MdNode::Image {
            url: link.url.clone(),
            alt: collect_text_from_children(node),
        },

        NodeValue::Math(math) if math.display_math => MdNode::MathBlock {
            value: math.literal.trim().to_string(),
        },

        NodeValue::Math(math) => MdNode::InlineMath {
            value: math.literal.trim().to_string(),
        },

        _ => {
            // Unknown node type, skip
            return None;
        }
    };

    Some(converted)
}

/// The formula of a paragraph holding a single display formula and nothing visible else
fn sole_display_math(children: &[MdNode]) -> Option<String> {
    let mut formulas = children.iter().filter(|child| match child {
        MdNode::Text { value } => !value.trim().is_empty(),
        MdNode::LineBreak => false,
        _ => true,
    });

    match (formulas.next(), formulas.next()) {
        (Some(MdNode::MathBlock { value }), None) => Some(value.clone()),
        _ => None,
    }
}

fn column_alignment(alignment: &TableAlignment) -> ColumnAlignment {
    match alignment {
        TableAlignment::Left => ColumnAlignment::Left,
        TableAlignment::Center => ColumnAlignment::Center,
        TableAlignment::Right => ColumnAlignment::Right,
        TableAlignment::None => ColumnAlignment::None,
    }
}

/// Collect text content from a node (for image alt text)
fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_content(child, output);
            }
        }
    }
}

fn collect_text_from_children<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        collect_text_content(child, &mut text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(source: &str) -> Vec<MdNode> {
        match parse_markdown(source) {
            MdNode::Document { children } => children,
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let doc = blocks("# Title\n\nSome *text*.");
        assert!(matches!(doc[0], MdNode::Heading { depth: 1, .. }));
        assert_eq!(doc[0].text_content(), "Title");
        match &doc[1] {
            MdNode::Paragraph { children } => {
                assert!(matches!(children[1], MdNode::Emphasis { .. }));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = blocks("3. three\n4. four");
        match &doc[0] {
            MdNode::List {
                ordered, start, children,
            } => {
                assert!(ordered);
                assert_eq!(*start, 3);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_task_items() {
        let doc = blocks("- [x] done\n- [ ] open\n- plain");
        let items = doc[0].children();
        assert!(matches!(items[0], MdNode::ListItem { checked: Some(true), .. }));
        assert!(matches!(items[1], MdNode::ListItem { checked: Some(false), .. }));
        assert!(matches!(items[2], MdNode::ListItem { checked: None, .. }));
    }

    #[test]
    fn test_inline_and_display_math() {
        let doc = blocks("Euler $e^{i\\pi}$ here.\n\n$$\n\\int_0^1 x\\,dx\n$$");
        let inline = doc[0]
            .children()
            .iter()
            .find(|node| matches!(node, MdNode::InlineMath { .. }));
        assert_eq!(
            inline,
            Some(&MdNode::InlineMath {
                value: "e^{i\\pi}".to_string()
            })
        );
        assert_eq!(
            doc[1],
            MdNode::MathBlock {
                value: "\\int_0^1 x\\,dx".to_string()
            }
        );
    }

    #[test]
    fn test_math_fence_is_math_block() {
        let doc = blocks("```math\nx^2\n```");
        assert_eq!(
            doc[0],
            MdNode::MathBlock {
                value: "x^2".to_string()
            }
        );
    }

    #[test]
    fn test_code_block_keeps_language() {
        let doc = blocks("```rust\nfn main() {}\n```");
        assert_eq!(
            doc[0],
            MdNode::CodeBlock {
                lang: Some("rust".to_string()),
                value: "fn main() {}".to_string()
            }
        );
    }

    #[test]
    fn test_table_alignments() {
        let doc = blocks("| a | b | c |\n|:--|:-:|--:|\n| 1 | 2 | 3 |");
        match &doc[0] {
            MdNode::Table {
                alignments,
                children,
            } => {
                assert_eq!(
                    alignments,
                    &vec![
                        ColumnAlignment::Left,
                        ColumnAlignment::Center,
                        ColumnAlignment::Right
                    ]
                );
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].children().len(), 3);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_image_alt_text() {
        let doc = blocks("![a *cat*](cat.png)");
        assert_eq!(
            doc[0].children()[0],
            MdNode::Image {
                url: "cat.png".to_string(),
                alt: "a cat".to_string()
            }
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(blocks(""), vec![]);
    }
}
