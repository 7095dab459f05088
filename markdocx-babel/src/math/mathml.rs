//! LaTeX → MathML through `latex2mathml`.

use crate::ir::xml::{parse_xml, XmlNode};
use latex2mathml::{latex_to_mathml, DisplayStyle};

const PARSE_ERROR_MARKER: &str = "[PARSE ERROR:";

/// Render `latex` as a parsed MathML `<math>` element.
///
/// `latex2mathml` reports unsupported commands as `[PARSE ERROR: ...]` text nodes while the
/// rest of the formula still renders. Any such marker fails the whole formula so the caller
/// keeps the source text instead of a formula with silently missing pieces.
pub fn tex_to_mathml(latex: &str, display: bool) -> Result<XmlNode, String> {
    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };

    let mathml = latex_to_mathml(latex, style).map_err(|e| e.to_string())?;
    if mathml.contains(PARSE_ERROR_MARKER) {
        return Err(format!("unsupported LaTeX command or token in `{latex}`"));
    }
    parse_xml(&mathml).map_err(|e| e.to_string())
}
