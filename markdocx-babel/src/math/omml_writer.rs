//! MathML → OMML.
//!
//! Walks the presentation MathML produced by `latex2mathml` and builds the equivalent OMML
//! element tree directly, so nothing is re-parsed from strings on the way into the package.
//! Sibling lists are converted as a whole because an n-ary operator absorbs the element that
//! follows it as its operand.

use super::symbols::{is_accent_char, is_bar_char, is_integral, is_nary_operator};
use crate::ir::xml::XmlNode;

const INVISIBLE_OPERATORS: [&str; 4] = ["\u{2061}", "\u{2062}", "\u{2063}", "\u{2064}"];

/// Convert a MathML `<math>` element into an `m:oMath` element.
pub fn mathml_to_omml(math: &XmlNode) -> XmlNode {
    XmlNode::element("m:oMath", convert_siblings(math.children()))
}

fn convert_siblings(nodes: &[XmlNode]) -> Vec<XmlNode> {
    let mut out = Vec::new();
    let mut index = 0;
    while index < nodes.len() {
        let node = &nodes[index];
        index += 1;

        if let Some((operator, lower, upper)) = nary_parts(node) {
            let operand = match nodes.get(index) {
                Some(next) if !is_operator_like(next) => {
                    index += 1;
                    convert(next)
                }
                _ => Vec::new(),
            };
            out.push(nary(&operator, lower, upper, operand));
            continue;
        }

        out.extend(convert(node));
    }
    out
}

fn convert(node: &XmlNode) -> Vec<XmlNode> {
    let name = match node {
        XmlNode::Text(text) => return text_run(text, false),
        XmlNode::Element { .. } => node.local_name(),
    };
    let children = element_children(node);

    match name {
        "mi" => {
            let text = node.text();
            let upright =
                text.chars().count() > 1 || node.attr("mathvariant") == Some("normal");
            text_run(&text, upright)
        }
        "mn" => text_run(&node.text(), false),
        "mo" => {
            let text = node.text();
            if INVISIBLE_OPERATORS.contains(&text.as_str()) {
                Vec::new()
            } else {
                text_run(&text, false)
            }
        }
        "mtext" | "ms" => {
            let text = node.text();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![normal_text_run(&text)]
            }
        }
        "mspace" => {
            let narrow = node
                .attr("width")
                .and_then(parse_em)
                .is_some_and(|width| width < 0.3);
            text_run(if narrow { "\u{2009}" } else { " " }, false)
        }
        "mfrac" => {
            let no_bar = node
                .attr("linethickness")
                .is_some_and(|value| matches!(value.trim(), "0" | "0px" | "0em" | "0pt"));
            let mut parts = Vec::new();
            if no_bar {
                parts.push(XmlNode::element("m:fPr", vec![val("m:type", "noBar")]));
            }
            parts.push(XmlNode::element("m:num", arg(&children, 0)));
            parts.push(XmlNode::element("m:den", arg(&children, 1)));
            vec![XmlNode::element("m:f", parts)]
        }
        "msqrt" => vec![XmlNode::element(
            "m:rad",
            vec![
                XmlNode::element("m:radPr", vec![val("m:degHide", "1")]),
                XmlNode::element("m:deg", Vec::new()),
                XmlNode::element("m:e", convert_siblings(node.children())),
            ],
        )],
        "mroot" => vec![XmlNode::element(
            "m:rad",
            vec![
                XmlNode::element("m:deg", arg(&children, 1)),
                XmlNode::element("m:e", arg(&children, 0)),
            ],
        )],
        "msup" => vec![XmlNode::element(
            "m:sSup",
            vec![
                XmlNode::element("m:e", arg(&children, 0)),
                XmlNode::element("m:sup", arg(&children, 1)),
            ],
        )],
        "msub" => vec![XmlNode::element(
            "m:sSub",
            vec![
                XmlNode::element("m:e", arg(&children, 0)),
                XmlNode::element("m:sub", arg(&children, 1)),
            ],
        )],
        "msubsup" => vec![XmlNode::element(
            "m:sSubSup",
            vec![
                XmlNode::element("m:e", arg(&children, 0)),
                XmlNode::element("m:sub", arg(&children, 1)),
                XmlNode::element("m:sup", arg(&children, 2)),
            ],
        )],
        "mover" => convert_over(node, &children),
        "munder" => convert_under(&children),
        "munderover" => vec![XmlNode::element(
            "m:limUpp",
            vec![
                XmlNode::element(
                    "m:e",
                    vec![XmlNode::element(
                        "m:limLow",
                        vec![
                            XmlNode::element("m:e", arg(&children, 0)),
                            XmlNode::element("m:lim", arg(&children, 1)),
                        ],
                    )],
                ),
                XmlNode::element("m:lim", arg(&children, 2)),
            ],
        )],
        "mtable" => vec![XmlNode::element(
            "m:m",
            children
                .iter()
                .filter(|row| row.is("mtr") || row.is("mlabeledtr"))
                .map(|row| {
                    let cells = element_children(row)
                        .into_iter()
                        .filter(|cell| cell.is("mtd"))
                        .map(|cell| XmlNode::element("m:e", convert_siblings(cell.children())))
                        .collect();
                    XmlNode::element("m:mr", cells)
                })
                .collect(),
        )],
        "mphantom" => vec![XmlNode::element(
            "m:phant",
            vec![XmlNode::element("m:e", convert_siblings(node.children()))],
        )],
        "menclose" => vec![XmlNode::element(
            "m:borderBox",
            vec![XmlNode::element("m:e", convert_siblings(node.children()))],
        )],
        "mfenced" => {
            let open = node.attr("open").unwrap_or("(");
            let close = node.attr("close").unwrap_or(")");
            let mut out = text_run(open, false);
            let separator = node.attr("separators").unwrap_or(",");
            for (position, child) in children.iter().enumerate() {
                if position > 0 && !separator.is_empty() {
                    out.extend(text_run(separator, false));
                }
                out.extend(convert(child));
            }
            out.extend(text_run(close, false));
            out
        }
        "annotation" | "annotation-xml" | "none" | "mprescripts" => Vec::new(),
        // mrow, mstyle, mpadded, semantics and anything unmodelled are transparent
        _ => convert_siblings(node.children()),
    }
}

fn element_children(node: &XmlNode) -> Vec<&XmlNode> {
    node.children()
        .iter()
        .filter(|child| matches!(child, XmlNode::Element { .. }))
        .collect()
}

/// The converted `index`-th argument of a fixed-arity MathML element.
fn arg(children: &[&XmlNode], index: usize) -> Vec<XmlNode> {
    children.get(index).map(|child| convert(child)).unwrap_or_default()
}

fn val(name: &str, value: &str) -> XmlNode {
    XmlNode::Element {
        name: name.to_string(),
        attributes: vec![("m:val".to_string(), value.to_string())],
        children: Vec::new(),
    }
}

fn math_text(text: &str) -> XmlNode {
    XmlNode::Element {
        name: "m:t".to_string(),
        attributes: vec![("xml:space".to_string(), "preserve".to_string())],
        children: vec![XmlNode::Text(text.to_string())],
    }
}

fn text_run(text: &str, upright: bool) -> Vec<XmlNode> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut children = Vec::new();
    if upright {
        children.push(XmlNode::element("m:rPr", vec![val("m:sty", "p")]));
    }
    children.push(math_text(text));
    vec![XmlNode::element("m:r", children)]
}

fn normal_text_run(text: &str) -> XmlNode {
    XmlNode::element(
        "m:r",
        vec![
            XmlNode::element("m:rPr", vec![XmlNode::element("m:nor", Vec::new())]),
            math_text(text),
        ],
    )
}

fn parse_em(width: &str) -> Option<f32> {
    width.trim().strip_suffix("em")?.trim().parse().ok()
}

/// Whether a node should not be absorbed as the operand of a preceding n-ary operator.
fn is_operator_like(node: &XmlNode) -> bool {
    node.is("mo") && !is_nary_operator(node.text().as_str())
}

/// Operator text of a bare large operator.
fn operator_text(node: &XmlNode) -> Option<String> {
    if !node.is("mo") {
        return None;
    }
    let text = node.text();
    is_nary_operator(text.trim()).then(|| text.trim().to_string())
}

/// Decompose a large operator, possibly carrying limits, into `(operator, lower, upper)`.
fn nary_parts(node: &XmlNode) -> Option<(String, Option<Vec<XmlNode>>, Option<Vec<XmlNode>>)> {
    if let Some(operator) = operator_text(node) {
        return Some((operator, None, None));
    }

    let children = element_children(node);
    let operator = operator_text(children.first()?)?;
    match node.local_name() {
        "msub" | "munder" => Some((operator, Some(arg(&children, 1)), None)),
        "msup" | "mover" => Some((operator, None, Some(arg(&children, 1)))),
        "msubsup" | "munderover" => Some((
            operator,
            Some(arg(&children, 1)),
            Some(arg(&children, 2)),
        )),
        _ => None,
    }
}

fn nary(
    operator: &str,
    lower: Option<Vec<XmlNode>>,
    upper: Option<Vec<XmlNode>>,
    operand: Vec<XmlNode>,
) -> XmlNode {
    let location = if is_integral(operator) {
        "subSup"
    } else {
        "undOvr"
    };
    let mut props = vec![val("m:chr", operator), val("m:limLoc", location)];
    if lower.is_none() {
        props.push(val("m:subHide", "1"));
    }
    if upper.is_none() {
        props.push(val("m:supHide", "1"));
    }

    XmlNode::element(
        "m:nary",
        vec![
            XmlNode::element("m:naryPr", props),
            XmlNode::element("m:sub", lower.unwrap_or_default()),
            XmlNode::element("m:sup", upper.unwrap_or_default()),
            XmlNode::element("m:e", operand),
        ],
    )
}

fn convert_over(node: &XmlNode, children: &[&XmlNode]) -> Vec<XmlNode> {
    let over = children.get(1).copied();
    let over_text = over.map(|o| o.text()).unwrap_or_default();
    let over_text = over_text.trim();
    let accent_flag = node.attr("accent") == Some("true")
        || over.is_some_and(|o| o.attr("accent") == Some("true"));

    if is_bar_char(over_text) {
        return vec![bar("top", arg(children, 0))];
    }
    if over_text == "⏞" {
        return vec![group_char(over_text, "top", arg(children, 0))];
    }
    if is_accent_char(over_text) || (accent_flag && over_text.chars().count() == 1) {
        return vec![XmlNode::element(
            "m:acc",
            vec![
                XmlNode::element("m:accPr", vec![val("m:chr", over_text)]),
                XmlNode::element("m:e", arg(children, 0)),
            ],
        )];
    }
    vec![XmlNode::element(
        "m:limUpp",
        vec![
            XmlNode::element("m:e", arg(children, 0)),
            XmlNode::element("m:lim", arg(children, 1)),
        ],
    )]
}

fn convert_under(children: &[&XmlNode]) -> Vec<XmlNode> {
    let under_text = children.get(1).map(|u| u.text()).unwrap_or_default();
    let under_text = under_text.trim();

    if is_bar_char(under_text) {
        return vec![bar("bot", arg(children, 0))];
    }
    if under_text == "⏟" {
        return vec![group_char(under_text, "bot", arg(children, 0))];
    }
    vec![XmlNode::element(
        "m:limLow",
        vec![
            XmlNode::element("m:e", arg(children, 0)),
            XmlNode::element("m:lim", arg(children, 1)),
        ],
    )]
}

fn bar(position: &str, body: Vec<XmlNode>) -> XmlNode {
    XmlNode::element(
        "m:bar",
        vec![
            XmlNode::element("m:barPr", vec![val("m:pos", position)]),
            XmlNode::element("m:e", body),
        ],
    )
}

fn group_char(chr: &str, position: &str, body: Vec<XmlNode>) -> XmlNode {
    XmlNode::element(
        "m:groupChr",
        vec![
            XmlNode::element(
                "m:groupChrPr",
                vec![val("m:chr", chr), val("m:pos", position)],
            ),
            XmlNode::element("m:e", body),
        ],
    )
}
