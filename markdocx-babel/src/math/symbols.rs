//! Character tables shared by both translation directions.

/// LaTeX for a mathematical Unicode symbol. Returns `None` for characters that pass through.
pub fn symbol_latex(ch: char) -> Option<&'static str> {
    let latex = match ch {
        '−' | '–' | '—' => "-",
        '∈' => "\\in ",
        '∉' => "\\notin ",
        '∋' => "\\ni ",
        '≤' => "\\leq ",
        '≥' => "\\geq ",
        '≠' => "\\neq ",
        '≈' => "\\approx ",
        '≡' => "\\equiv ",
        '∞' => "\\infty ",
        '√' => "\\sqrt ",
        '∑' => "\\sum ",
        '∏' => "\\prod ",
        '∫' => "\\int ",
        '∮' => "\\oint ",
        '∂' => "\\partial ",
        '∆' => "\\Delta ",
        '∇' => "\\nabla ",
        '·' | '⋅' => "\\cdot ",
        '×' => "\\times ",
        '÷' => "\\div ",
        '±' => "\\pm ",
        '∓' => "\\mp ",
        '→' => "\\to ",
        '←' => "\\leftarrow ",
        '↔' => "\\leftrightarrow ",
        '⇒' => "\\Rightarrow ",
        '⇔' => "\\Leftrightarrow ",
        '∧' => "\\land ",
        '∨' => "\\lor ",
        '¬' => "\\neg ",
        '∠' | '∟' => "\\angle ",
        '⊂' => "\\subset ",
        '⊃' => "\\supset ",
        '⊆' => "\\subseteq ",
        '⊇' => "\\supseteq ",
        '⊄' => "\\nsubseteq ",
        '⊅' => "\\nsupseteq ",
        '⊕' => "\\oplus ",
        '⊗' => "\\otimes ",
        '⊞' => "\\boxplus ",
        '⊠' => "\\boxtimes ",
        '⊥' => "\\perp ",
        '∥' => "\\parallel ",
        '∝' => "\\propto ",
        '∪' => "\\cup ",
        '∩' => "\\cap ",
        '∖' => "\\setminus ",
        '∸' => "\\dotminus ",
        '∗' => "\\ast ",
        '∘' => "\\circ ",
        '∴' => "\\therefore ",
        '∵' => "\\because ",
        'ℵ' => "\\aleph ",
        'ℏ' => "\\hbar ",
        'ℓ' => "\\ell ",
        '℘' => "\\wp ",
        'ℑ' => "\\Im ",
        'ℜ' => "\\Re ",
        'ℚ' => "\\mathbb{Q} ",
        'ℝ' => "\\mathbb{R} ",
        'ℤ' => "\\mathbb{Z} ",
        'ℂ' => "\\mathbb{C} ",
        'ℕ' => "\\mathbb{N} ",
        '°' => "^{\\circ}",
        '′' => "'",
        '″' => "''",
        '‴' => "'''",
        '™' => "\\text{TM}",
        _ => return None,
    };
    Some(latex)
}

/// LaTeX macro for a Greek letter.
pub fn greek_latex(ch: char) -> Option<&'static str> {
    let latex = match ch {
        'α' => "\\alpha ",
        'β' => "\\beta ",
        'γ' => "\\gamma ",
        'δ' => "\\delta ",
        'ε' => "\\epsilon ",
        'ζ' => "\\zeta ",
        'η' => "\\eta ",
        'θ' => "\\theta ",
        'ι' => "\\iota ",
        'κ' => "\\kappa ",
        'λ' => "\\lambda ",
        'μ' => "\\mu ",
        'ν' => "\\nu ",
        'ξ' => "\\xi ",
        'ο' => "o",
        'π' => "\\pi ",
        'ρ' => "\\rho ",
        'σ' => "\\sigma ",
        'τ' => "\\tau ",
        'υ' => "\\upsilon ",
        'φ' => "\\phi ",
        'χ' => "\\chi ",
        'ψ' => "\\psi ",
        'ω' => "\\omega ",
        'ϕ' => "\\varphi ",
        'ϑ' => "\\vartheta ",
        'ϖ' => "\\varpi ",
        'ϱ' => "\\varrho ",
        'ϵ' => "\\varepsilon ",
        'Α' => "\\Alpha ",
        'Β' => "\\Beta ",
        'Γ' => "\\Gamma ",
        'Δ' => "\\Delta ",
        'Ε' => "\\Epsilon ",
        'Ζ' => "\\Zeta ",
        'Η' => "\\Eta ",
        'Θ' => "\\Theta ",
        'Ι' => "\\Iota ",
        'Κ' => "\\Kappa ",
        'Λ' => "\\Lambda ",
        'Μ' => "\\Mu ",
        'Ν' => "\\Nu ",
        'Ξ' => "\\Xi ",
        'Ο' => "\\Omicron ",
        'Π' => "\\Pi ",
        'Ρ' => "\\Rho ",
        'Σ' => "\\Sigma ",
        'Τ' => "\\Tau ",
        'Υ' => "\\Upsilon ",
        'Φ' => "\\Phi ",
        'Χ' => "\\Chi ",
        'Ψ' => "\\Psi ",
        'Ω' => "\\Omega ",
        _ => return None,
    };
    Some(latex)
}

/// Accent command for an `m:acc` character. Unknown accents render as a hat.
pub fn accent_command(chr: &str) -> &'static str {
    match chr {
        "ˉ" | "¯" => "\\bar",
        "ˊ" | "´" => "\\acute",
        "˝" | "¨" => "\\ddot",
        "˙" => "\\dot",
        "˘" => "\\breve",
        "ˇ" => "\\check",
        "^" | "\u{302}" | "ˆ" => "\\hat",
        "~" | "\u{303}" | "˜" => "\\tilde",
        "˚" => "\\mathring",
        "ˋ" => "\\grave",
        "→" | "\u{20d7}" => "\\vec",
        _ => "\\hat",
    }
}

/// Brace command for an `m:groupChr` character.
pub fn group_char_command(chr: &str) -> Option<&'static str> {
    match chr {
        "⏞" | "⎵" => Some("\\overbrace"),
        "⏟" | "⎴" => Some("\\underbrace"),
        _ => None,
    }
}

/// Upright function names that LaTeX spells as commands.
pub fn function_command(name: &str) -> Option<&'static str> {
    const FUNCTIONS: [&str; 22] = [
        "sin", "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh",
        "tanh", "log", "ln", "exp", "lim", "max", "min", "sup", "inf", "det", "gcd",
    ];
    FUNCTIONS
        .iter()
        .find(|candidate| **candidate == name)
        .copied()
}

/// Whether a MathML operator is a large n-ary operator that takes its limits as scripts.
pub fn is_nary_operator(text: &str) -> bool {
    matches!(
        text,
        "∑" | "∏" | "∐" | "∫" | "∬" | "∭" | "∮" | "⋃" | "⋂" | "⋁" | "⋀" | "⨁" | "⨂"
    )
}

/// Integrals keep their limits beside the sign rather than above and below.
pub fn is_integral(text: &str) -> bool {
    matches!(text, "∫" | "∬" | "∭" | "∮")
}

/// Characters that MathML uses for an accent over its base.
pub fn is_accent_char(text: &str) -> bool {
    matches!(
        text,
        "^" | "ˆ"
            | "\u{302}"
            | "~"
            | "˜"
            | "\u{303}"
            | "¯"
            | "ˉ"
            | "˙"
            | "¨"
            | "˘"
            | "ˇ"
            | "´"
            | "ˊ"
            | "`"
            | "ˋ"
            | "˚"
            | "→"
            | "\u{20d7}"
    )
}

/// Characters that draw a horizontal rule over or under the base.
pub fn is_bar_char(text: &str) -> bool {
    matches!(text, "‾" | "_" | "\u{332}" | "\u{305}" | "―")
}

/// Text normalisation applied to every run of OMML text before symbol mapping.
pub fn normalize_math_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{a0}' => out.push(' '),
            '\u{2009}' | '\u{202f}' => out.push_str("\\,"),
            '\u{2061}' => {}
            _ => {
                if let Some(latex) = greek_latex(ch).or_else(|| symbol_latex(ch)) {
                    out.push_str(latex);
                } else {
                    out.push(ch);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_greek_and_symbols() {
        assert_eq!(normalize_math_text("α≤β"), "\\alpha \\leq \\beta ");
        assert_eq!(normalize_math_text("x\u{2009}y"), "x\\,y");
        assert_eq!(normalize_math_text("f\u{2061}"), "f");
        assert_eq!(normalize_math_text("ℝ"), "\\mathbb{R} ");
    }

    #[test]
    fn unknown_accent_defaults_to_hat() {
        assert_eq!(accent_command("¨"), "\\ddot");
        assert_eq!(accent_command("?"), "\\hat");
    }
}
