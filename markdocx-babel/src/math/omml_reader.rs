//! OMML → LaTeX.
//!
//! A recursive walk dispatched on the local element name. Property containers and revision
//! markers contribute nothing; any other unmodelled element recurses into its children so
//! wrapped content is never dropped.

use super::symbols::{
    accent_command, function_command, group_char_command, normalize_math_text,
};
use crate::ir::xml::XmlNode;

/// Translate an OMML element (usually `m:oMath` or `m:oMathPara`) into LaTeX.
pub fn omml_to_latex(node: &XmlNode) -> String {
    convert(node).trim().to_string()
}

fn is_ignored(local: &str) -> bool {
    matches!(
        local,
        "rPr" | "ctrlPr" | "argPr" | "ins" | "del" | "bookmarkStart" | "bookmarkEnd"
    )
}

fn convert(node: &XmlNode) -> String {
    let name = match node {
        XmlNode::Text(text) => return normalize_math_text(text),
        XmlNode::Element { .. } => node.local_name(),
    };

    match name {
        "oMath" | "oMathPara" => flatten(node.children()),
        "r" => convert_run(node),
        "t" => normalize_math_text(&node.text()),
        "sym" => symbol(node)
            .map(|decoded| normalize_math_text(&decoded))
            .unwrap_or_default(),
        "f" => {
            let num = part(node, "num");
            let den = part(node, "den");
            format!("\\frac{{{}}}{{{}}}", or_one(num), or_one(den))
        }
        "sSup" => format!("{}^{{{}}}", part(node, "e"), or_one(part(node, "sup"))),
        "sSub" => format!("{}_{{{}}}", part(node, "e"), or_one(part(node, "sub"))),
        "sSubSup" => format!(
            "{}_{{{}}}^{{{}}}",
            part(node, "e"),
            or_one(part(node, "sub")),
            or_one(part(node, "sup"))
        ),
        "nary" => convert_nary(node),
        "rad" => {
            let degree = part(node, "deg");
            let expr = part(node, "e");
            if degree.is_empty() {
                format!("\\sqrt{{{expr}}}")
            } else {
                format!("\\sqrt[{degree}]{{{expr}}}")
            }
        }
        "bar" => {
            let position = property(node, "barPr", "pos").unwrap_or("top");
            let wrap = if position == "bot" {
                "\\underline"
            } else {
                "\\overline"
            };
            format!("{wrap}{{{}}}", part(node, "e"))
        }
        "acc" => {
            let command = property(node, "accPr", "chr").map_or("\\hat", accent_command);
            format!("{command}{{{}}}", part(node, "e"))
        }
        "groupChr" => convert_group_char(node),
        "borderBox" | "box" => format!("\\boxed{{{}}}", flatten(node.children())),
        "phant" | "phantom" => format!("\\phantom{{{}}}", flatten(node.children())),
        "m" => convert_matrix(node),
        "lim" | "limUpp" | "limLow" => convert_limit(node, name),
        "func" => convert_function(node),
        "d" => node
            .children()
            .iter()
            .filter(|child| !is_ignored(child.local_name()))
            .map(convert)
            .collect(),
        local if is_ignored(local) => String::new(),
        _ => flatten(node.children()),
    }
}

fn flatten(nodes: &[XmlNode]) -> String {
    nodes.iter().map(convert).collect()
}

/// Converted content of the named child, empty when absent.
fn part(node: &XmlNode, local: &str) -> String {
    node.child(local)
        .map(|child| flatten(child.children()))
        .unwrap_or_default()
}

fn or_one(value: String) -> String {
    if value.is_empty() {
        "1".to_string()
    } else {
        value
    }
}

/// `m:val` of a property element nested in a `*Pr` container.
fn property<'a>(node: &'a XmlNode, container: &str, local: &str) -> Option<&'a str> {
    node.child(container)?.child(local)?.attr("val")
}

fn symbol(node: &XmlNode) -> Option<String> {
    let value = node
        .qualified_attr("w:char")
        .or_else(|| node.qualified_attr("m:val"))?;
    decode_symbol(value)
}

/// Decode a `w:sym` character code. Hex codes become their scalar, anything else is kept.
pub(crate) fn decode_symbol(value: &str) -> Option<String> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return None;
    }
    if normalized.chars().all(|ch| ch.is_ascii_hexdigit()) {
        if let Some(ch) = u32::from_str_radix(normalized, 16)
            .ok()
            .and_then(char::from_u32)
        {
            return Some(ch.to_string());
        }
    }
    Some(normalized.to_string())
}

fn convert_run(node: &XmlNode) -> String {
    let plain_text = node
        .child("rPr")
        .is_some_and(|props| props.child("nor").is_some());

    let mut out = String::new();
    for child in node.children() {
        match child {
            XmlNode::Text(text) => out.push_str(&normalize_math_text(text)),
            XmlNode::Element { .. } => match child.local_name() {
                "t" => {
                    let text = child.text();
                    if plain_text {
                        if !text.is_empty() {
                            out.push_str(&format!("\\text{{{text}}}"));
                        }
                    } else if let Some(command) = function_command(text.trim()) {
                        out.push('\\');
                        out.push_str(command);
                        out.push(' ');
                    } else {
                        out.push_str(&normalize_math_text(&text));
                    }
                }
                "sym" => {
                    if let Some(decoded) = symbol(child) {
                        out.push_str(&normalize_math_text(&decoded));
                    }
                }
                "br" => out.push_str("\\\\"),
                "tab" => out.push('\t'),
                local if is_ignored(local) => {}
                _ => out.push_str(&convert(child)),
            },
        }
    }
    out
}

fn convert_nary(node: &XmlNode) -> String {
    let symbol = property(node, "naryPr", "chr")
        .map(normalize_math_text)
        .unwrap_or_else(|| "\\sum ".to_string());
    let sub = part(node, "sub");
    let sup = part(node, "sup");
    let expr = part(node, "e");

    let mut out = symbol.trim().to_string();
    if !sub.is_empty() {
        out.push_str(&format!("_{{{sub}}}"));
    }
    if !sup.is_empty() {
        out.push_str(&format!("^{{{sup}}}"));
    }
    if !expr.is_empty() {
        out.push(' ');
        out.push_str(&expr);
    }
    out.trim().to_string()
}

fn convert_group_char(node: &XmlNode) -> String {
    let chr = node.child("groupChrPr").and_then(|props| props.child("chr"));
    let body = part(node, "e");
    match chr.and_then(|c| c.attr("val")).and_then(group_char_command) {
        Some(command) => format!("{command}{{{body}}}"),
        None => {
            let bottom = chr.and_then(|c| c.attr("pos")) == Some("bot")
                || node
                    .child("groupChrPr")
                    .and_then(|props| props.child("pos"))
                    .and_then(|pos| pos.attr("val"))
                    == Some("bot");
            if bottom {
                format!("\\underline{{{body}}}")
            } else {
                format!("\\overline{{{body}}}")
            }
        }
    }
}

fn convert_matrix(node: &XmlNode) -> String {
    let rows: Vec<String> = node
        .children_named("mr")
        .map(|row| {
            let cells: Vec<String> = row
                .children_named("e")
                .map(|cell| flatten(cell.children()))
                .collect();
            cells.join(" & ")
        })
        .collect();
    format!("\\begin{{matrix}}{}\\end{{matrix}}", rows.join(" \\\\ "))
}

fn convert_limit(node: &XmlNode, tag: &str) -> String {
    let expr = part(node, "e");
    let bound = part(node, "lim");
    let (sub, sup) = match tag {
        "limLow" => (bound, String::new()),
        "limUpp" => (String::new(), bound),
        _ => (
            node.child("limLow")
                .map(|low| flatten(low.children()))
                .unwrap_or_else(|| part(node, "sub")),
            node.child("limUpp")
                .map(|upp| flatten(upp.children()))
                .unwrap_or_else(|| part(node, "sup")),
        ),
    };

    // A `lim` base written as upright text is the limit operator itself.
    let (base, trailing) = if tag == "lim" {
        ("\\lim".to_string(), expr)
    } else if matches!(expr.trim(), "\\lim" | "lim") {
        ("\\lim".to_string(), String::new())
    } else {
        (expr, String::new())
    };

    let mut out = base;
    if !sub.is_empty() {
        out.push_str(&format!("_{{{sub}}}"));
    }
    if !sup.is_empty() {
        out.push_str(&format!("^{{{sup}}}"));
    }
    if !trailing.is_empty() {
        out.push(' ');
        out.push_str(&trailing);
    }
    out.trim().to_string()
}

fn convert_function(node: &XmlNode) -> String {
    let name = part(node, "fName");
    let arg = part(node, "e");
    let name = name.trim();
    if name.is_empty() {
        return arg;
    }
    if name.starts_with('\\') {
        format!("{name} {arg}")
    } else {
        format!("\\operatorname{{{name}}} {arg}")
    }
}
