//! Paragraph content → inline Markdown.
//!
//! One recursive routine walks runs, hyperlinks, fields, formulas and drawings. Wrapper
//! elements it does not model are descended into, so their text is kept.

use super::converter::ReverseConverter;
use super::relationships::{has_scheme, resolve_part_path};
use crate::common::converted::Converted;
use crate::ir::xml::XmlNode;
use crate::math::omml_to_latex;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

const ESCAPED_CHARS: [char; 6] = ['*', '_', '`', '[', ']', '|'];
const DEFAULT_ALT: &str = "image";
const HARD_BREAK: &str = "  \n";
const TAB: &str = "    ";

static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*)([#>+-])").expect("valid leading-marker regex"));
static FIELD_HYPERLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)HYPERLINK\s+"([^"]+)""#).expect("valid hyperlink field regex"));

/// Elements that never carry visible content
fn is_property(local: &str) -> bool {
    matches!(
        local,
        "pPr" | "rPr" | "sdtPr" | "sdtEndPr" | "bookmarkStart" | "bookmarkEnd" | "proofErr"
    )
}

/// Run-level formatting read from `w:rPr`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub hidden: bool,
}

impl RunStyle {
    pub fn from_run(run: &XmlNode) -> Self {
        let mut style = RunStyle::default();
        let Some(rpr) = run.child("rPr") else {
            return style;
        };
        for prop in rpr.children() {
            match prop.local_name() {
                "b" => style.bold = is_enabled(prop),
                "i" => style.italic = is_enabled(prop),
                "u" => {
                    style.underline = prop
                        .attr("val")
                        .map_or(true, |v| !v.eq_ignore_ascii_case("none"))
                }
                "strike" | "dstrike" => style.strike = is_enabled(prop),
                "vanish" => style.hidden = true,
                "rStyle" => {
                    if prop
                        .attr("val")
                        .is_some_and(|v| v.to_lowercase().contains("code"))
                    {
                        style.code = true;
                    }
                }
                _ => {}
            }
        }
        style
    }

    /// Wrap already-escaped text in Markdown emphasis markers. Surrounding whitespace stays
    /// outside the markers.
    fn apply(&self, text: &str, in_link: bool) -> String {
        let core = text.trim();
        if core.is_empty() {
            return text.to_string();
        }
        let lead = &text[..text.len() - text.trim_start().len()];
        let trail = &text[text.trim_end().len()..];

        let mut formatted = match (self.bold, self.italic) {
            (true, true) => format!("***{core}***"),
            (true, false) => format!("**{core}**"),
            (false, true) => format!("*{core}*"),
            (false, false) => core.to_string(),
        };
        if self.strike {
            formatted = format!("~~{formatted}~~");
        }
        if self.underline && !in_link {
            formatted = format!("<u>{formatted}</u>");
        }
        format!("{lead}{formatted}{trail}")
    }
}

/// Toggle properties are on unless their value says otherwise.
fn is_enabled(prop: &XmlNode) -> bool {
    match prop.attr("val") {
        None => true,
        Some(value) => !matches!(value.to_lowercase().as_str(), "false" | "0" | "off"),
    }
}

/// Line endings to `\n`, non-breaking space to space, non-breaking hyphen to `-`
pub fn normalize_run_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00A0}', " ")
        .replace('\u{2011}', "-")
}

/// Backslash-escape characters Markdown would interpret.
pub fn escape_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\\' || ESCAPED_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    LEADING_MARKER.replace_all(&escaped, r"${1}\${2}").into_owned()
}

/// Inline code span, with a double-backtick fence when the content holds a backtick
pub fn format_inline_code(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let fence = if normalized.contains('`') { "``" } else { "`" };
    format!("{fence}{}{fence}", normalized.trim())
}

/// Decode a `w:sym` character code (hex) into text.
pub fn decode_symbol(value: &str) -> String {
    let value = value.trim();
    u32::from_str_radix(value, 16)
        .ok()
        .and_then(char::from_u32)
        .map_or_else(|| value.to_string(), |ch| ch.to_string())
}

fn wrap_inline_math(latex: &str) -> String {
    let latex = latex.trim();
    if latex.is_empty() {
        String::new()
    } else {
        format!("${latex}$")
    }
}

/// Plain text of paragraph content: breaks as `\n`, tabs as `\t`, no escaping.
pub fn plain_text(nodes: &[XmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element { .. } => match node.local_name() {
                local if is_property(local) => {}
                "br" | "cr" => out.push('\n'),
                "tab" => out.push('\t'),
                "t" | "instrText" | "delText" => out.push_str(&node.text()),
                _ => out.push_str(&plain_text(node.children())),
            },
        }
    }
    out.replace("\r\n", "\n").replace('\r', "\n")
}

impl ReverseConverter<'_> {
    /// Convert paragraph children (or any inline container) into Markdown.
    pub(super) fn convert_inline(&mut self, nodes: &[XmlNode], in_link: bool) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                XmlNode::Text(text) => out.push_str(&escape_markdown(&normalize_run_text(text))),
                XmlNode::Element { .. } => match node.local_name() {
                    local if is_property(local) => {}
                    "r" => out.push_str(&self.convert_run(node, in_link)),
                    "hyperlink" => out.push_str(&self.convert_hyperlink(node)),
                    "fldSimple" => out.push_str(&self.convert_simple_field(node, in_link)),
                    "oMath" | "oMathPara" => {
                        out.push_str(&self.cell_safe(wrap_inline_math(&omml_to_latex(node))))
                    }
                    "br" | "cr" => out.push_str(HARD_BREAK),
                    "tab" => out.push_str(TAB),
                    "drawing" => out.push_str(&self.convert_drawing(node)),
                    "footnoteReference" => out.push_str(&footnote_reference(node)),
                    // sdt, smartTag, ins and friends are transparent
                    _ => out.push_str(&self.convert_inline(node.children(), in_link)),
                },
            }
        }
        out
    }

    fn convert_run(&mut self, run: &XmlNode, in_link: bool) -> String {
        let style = RunStyle::from_run(run);
        if style.hidden {
            return String::new();
        }
        let escape = |text: &str| {
            let text = normalize_run_text(text);
            if style.code {
                text
            } else {
                escape_markdown(&text)
            }
        };

        let mut text = String::new();
        for child in run.children() {
            match child {
                XmlNode::Text(value) => text.push_str(&escape(value)),
                XmlNode::Element { .. } => match child.local_name() {
                    local if is_property(local) => {}
                    "t" | "instrText" | "delText" => text.push_str(&escape(&child.text())),
                    "tab" => text.push_str(TAB),
                    "br" | "cr" => text.push_str(HARD_BREAK),
                    "sym" => {
                        if let Some(code) = child.attr("char").or_else(|| child.attr("sym")) {
                            text.push_str(&escape(&decode_symbol(code)));
                        }
                    }
                    "drawing" => text.push_str(&self.convert_drawing(child)),
                    "oMath" | "oMathPara" => {
                        text.push_str(&self.cell_safe(wrap_inline_math(&omml_to_latex(child))))
                    }
                    "footnoteReference" => text.push_str(&footnote_reference(child)),
                    _ => text.push_str(&self.convert_inline(child.children(), in_link)),
                },
            }
        }

        if text.is_empty() {
            return text;
        }
        if style.code {
            return self.cell_safe(format_inline_code(&text));
        }
        style.apply(&text, in_link)
    }

    /// Inside a table cell, escape the pipes of spans that skip Markdown escaping.
    fn cell_safe(&self, span: String) -> String {
        if self.in_table_cell {
            span.replace('|', r"\|")
        } else {
            span
        }
    }

    fn convert_hyperlink(&mut self, node: &XmlNode) -> String {
        let text = self.convert_inline(node.children(), true);
        if let Some(anchor) = node.attr("anchor") {
            return format!("[{text}](#{anchor})");
        }
        let href = node
            .qualified_attr("r:id")
            .or_else(|| node.attr("id"))
            .and_then(|id| self.relationships.get(id))
            .map(|rel| {
                if rel.external || has_scheme(&rel.target) {
                    rel.target.clone()
                } else {
                    resolve_part_path(&rel.target)
                }
            });
        match href {
            Some(href) if !href.is_empty() => format!("[{text}]({href})"),
            _ => text,
        }
    }

    fn convert_simple_field(&mut self, node: &XmlNode, in_link: bool) -> String {
        let url = node
            .attr("instr")
            .and_then(|instr| FIELD_HYPERLINK.captures(instr))
            .and_then(|captures| captures.get(1))
            .map(|url| url.as_str().to_string());
        match url {
            Some(url) => {
                let label = self.convert_inline(node.children(), true);
                let label = if label.is_empty() { url.clone() } else { label };
                format!("[{label}]({url})")
            }
            None => self.convert_inline(node.children(), in_link),
        }
    }

    fn convert_drawing(&mut self, node: &XmlNode) -> String {
        let alt = node
            .find(&|n: &XmlNode| n.is("docPr"))
            .and_then(|doc_pr| {
                doc_pr
                    .attr("descr")
                    .filter(|d| !d.is_empty())
                    .or_else(|| doc_pr.attr("title").filter(|t| !t.is_empty()))
            })
            .unwrap_or(DEFAULT_ALT);
        let alt = escape_markdown(alt);
        let embed = node
            .find(&|n: &XmlNode| n.is("blip"))
            .and_then(|blip| blip.qualified_attr("r:embed").or_else(|| blip.attr("embed")))
            .map(str::to_string);

        let source = match embed {
            Some(_) if !self.options.embed_images => {
                Converted::Fallback("image embedding disabled".to_string())
            }
            Some(rel_id) => match self.images.resolve(&self.relationships, &rel_id) {
                Some(data_url) => Converted::Value(data_url),
                None => Converted::Fallback(format!("unresolvable image {rel_id}")),
            },
            None => Converted::Fallback("drawing without an embedded image".to_string()),
        };
        let url = source.unwrap_or_else(|reason| {
            debug!("Image degraded to an empty reference: {reason}");
            String::new()
        });
        format!("![{alt}]({url})")
    }
}

fn footnote_reference(node: &XmlNode) -> String {
    node.attr("id")
        .map(|id| format!("[^{id}]"))
        .unwrap_or_default()
}
