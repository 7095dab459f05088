//! LaTeX → OMML → LaTeX

use markdocx_babel::common::converted::Converted;
use markdocx_babel::math::{latex_to_omml, omml_to_latex, translate_formula};

fn through_omml(latex: &str) -> String {
    let omml = latex_to_omml(latex, false).unwrap_or_else(|| panic!("no OMML for {latex}"));
    omml_to_latex(&omml)
}

#[test]
fn test_structures_survive() {
    assert_eq!(through_omml("\\frac{x}{2}"), "\\frac{x}{2}");
    assert_eq!(through_omml("r^{2}"), "r^{2}");
    assert!(through_omml("\\sqrt{y}").contains("\\sqrt{y}"));
    assert!(through_omml("x_{i}").contains("x_{i}"));
}

#[test]
fn test_greek_letters_come_back_as_commands() {
    let latex = through_omml("\\alpha + \\beta");
    assert!(latex.contains("\\alpha"));
    assert!(latex.contains("\\beta"));
}

#[test]
fn test_display_formulas_are_wrapped() {
    let display = latex_to_omml("x", true).unwrap();
    assert_eq!(display.name(), Some("m:oMathPara"));
    assert_eq!(omml_to_latex(&display), "x");
}

#[test]
fn test_empty_formula_falls_back_to_source() {
    assert_eq!(
        translate_formula("   ", true),
        Converted::Fallback("$$   $$".to_string())
    );
    assert_eq!(translate_formula("", false), Converted::Fallback("$$".to_string()));
    assert!(!translate_formula("x^2", false).is_fallback());
}

#[test]
fn test_unknown_commands_keep_the_source_text() {
    assert_eq!(
        translate_formula("\\foo{x} + y", false),
        Converted::Fallback("$\\foo{x} + y$".to_string())
    );
    assert!(latex_to_omml("\\alpha + \\foo", true).is_none());
}
