//! Two-way translation between LaTeX formulas and Office Math Markup (OMML).
//!
//! Forward (export): LaTeX is rendered to MathML by `latex2mathml`, the MathML tree is
//! rewritten into OMML elements ([`omml_writer`]) and the result is sanitized before it is
//! embedded in a paragraph. Any failure yields `None` and the caller keeps the literal
//! `$...$` / `$$...$$` text instead.
//!
//! Reverse (import): [`omml_reader`] walks an OMML tree and emits LaTeX without any external
//! dependency.

pub mod mathml;
pub mod omml_reader;
pub mod omml_writer;
pub mod symbols;

use crate::common::converted::Converted;
use crate::ir::xml::XmlNode;
use log::warn;

pub use omml_reader::omml_to_latex;

/// Translate a LaTeX formula into an OMML element.
///
/// Inline formulas produce an `m:oMath` element, display formulas an `m:oMathPara` wrapping
/// one. Returns `None` for empty input or when rendering fails.
pub fn latex_to_omml(latex: &str, display: bool) -> Option<XmlNode> {
    let latex = latex.trim();
    if latex.is_empty() {
        return None;
    }

    let math = match mathml::tex_to_mathml(latex, display) {
        Ok(math) => math,
        Err(err) => {
            warn!("Could not convert LaTeX to OMML ({err}): {latex}");
            return None;
        }
    };

    let omath = sanitize(omml_writer::mathml_to_omml(&math))?;
    if omath.children().is_empty() {
        warn!("LaTeX produced an empty formula: {latex}");
        return None;
    }

    if display {
        Some(XmlNode::element("m:oMathPara", vec![omath]))
    } else {
        Some(omath)
    }
}

/// Translate a formula, falling back to its delimited source text.
pub fn translate_formula(latex: &str, display: bool) -> Converted<XmlNode> {
    match latex_to_omml(latex, display) {
        Some(node) => Converted::Value(node),
        None if display => Converted::Fallback(format!("$${latex}$$")),
        None => Converted::Fallback(format!("${latex}$")),
    }
}

/// Remove the artefacts an OMML transform can leave behind: attributes valued
/// `"undefined"`, `m:sty` elements with an undefined value and empty run-property elements.
pub fn sanitize(node: XmlNode) -> Option<XmlNode> {
    match node {
        XmlNode::Text(_) => Some(node),
        XmlNode::Element {
            name,
            attributes,
            children,
        } => {
            let local = name.rsplit_once(':').map_or(name.as_str(), |(_, l)| l);
            if local == "sty"
                && attributes
                    .iter()
                    .any(|(_, value)| value == "undefined")
            {
                return None;
            }

            let attributes: Vec<(String, String)> = attributes
                .into_iter()
                .filter(|(_, value)| value != "undefined")
                .collect();
            let children: Vec<XmlNode> = children.into_iter().filter_map(sanitize).collect();

            if local == "rPr" && attributes.is_empty() && children.is_empty() {
                return None;
            }

            Some(XmlNode::Element {
                name,
                attributes,
                children,
            })
        }
    }
}
