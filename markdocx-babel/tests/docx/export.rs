//! Export tests (Markdown → DOCX)

use crate::common::{
    attribute_values, element_count, export, export_with, part_text, png, MemoryFetcher,
};
use markdocx_babel::formats::docx::package::{integrity_issues, PackageReader};
use markdocx_babel::{export_markdown, ExportOptions, FormatError};
use std::collections::HashMap;

const REQUIRED_PARTS: [&str; 6] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/document.xml",
    "word/_rels/document.xml.rels",
    "word/styles.xml",
    "word/numbering.xml",
];

fn document_xml(markdown: &str) -> String {
    part_text(&export(markdown), "word/document.xml")
}

#[test]
fn test_package_has_every_part_and_passes_integrity() {
    let bytes = export("# Title\n\nBody with a [link](https://example.com).");
    assert!(integrity_issues(&bytes).is_empty());

    let reader = PackageReader::open(&bytes).unwrap();
    for part in REQUIRED_PARTS {
        assert!(reader.contains(part), "missing {part}");
    }
}

#[test]
fn test_empty_markdown_still_produces_a_document() {
    let xml = document_xml("");
    assert_eq!(element_count(&xml, "body"), 1);
    assert_eq!(element_count(&xml, "p"), 1);
}

#[test]
fn test_headings_use_heading_styles() {
    let xml = document_xml("# One\n\n###### Six");
    assert_eq!(attribute_values(&xml, "pStyle", "val"), vec!["Heading1", "Heading6"]);
}

#[test]
fn test_ordered_list_with_start_gets_its_own_definition() {
    let bytes = export("3. a\n4. b\n\n- bullet");
    let document = part_text(&bytes, "word/document.xml");
    let numbering = part_text(&bytes, "word/numbering.xml");

    assert_eq!(attribute_values(&document, "numId", "val"), vec!["4", "4", "2"]);
    assert!(attribute_values(&numbering, "abstractNum", "abstractNumId").contains(&"4".to_string()));
    assert!(attribute_values(&numbering, "start", "val").contains(&"3".to_string()));
}

#[test]
fn test_images_are_embedded_and_clamped() {
    let fetcher = MemoryFetcher::default().with("wide.png", png(600, 100), Some("image/png"));
    let bytes = export_with("![Wide chart](wide.png)", &fetcher);

    let document = part_text(&bytes, "word/document.xml");
    assert_eq!(attribute_values(&document, "extent", "cx"), vec!["4572000"]);
    assert_eq!(attribute_values(&document, "extent", "cy"), vec!["1143000"]);
    assert_eq!(attribute_values(&document, "docPr", "descr"), vec!["Wide chart"]);

    let reader = PackageReader::open(&bytes).unwrap();
    assert!(reader
        .part_names()
        .iter()
        .any(|name| name.starts_with("word/media/") && name.ends_with(".png")));
    assert!(part_text(&bytes, "word/_rels/document.xml.rels").contains("media/"));
}

#[test]
fn test_failed_image_degrades_to_literal_markdown() {
    let bytes = export("Before ![logo](https://example.invalid/logo.png) after");
    assert!(integrity_issues(&bytes).is_empty());

    let document = part_text(&bytes, "word/document.xml");
    assert!(document.contains("![logo](https://example.invalid/logo.png)"));
    assert_eq!(element_count(&document, "drawing"), 0);
}

#[test]
fn test_undecodable_image_degrades_to_literal_markdown() {
    let fetcher =
        MemoryFetcher::default().with("broken.png", b"not a bitmap".to_vec(), Some("image/png"));
    let bytes = export_with("![broken](broken.png)", &fetcher);
    let document = part_text(&bytes, "word/document.xml");
    assert!(document.contains("![broken](broken.png)"));
    assert_eq!(element_count(&document, "drawing"), 0);
}

#[test]
fn test_math_becomes_office_math() {
    let xml = document_xml("Inline $x^2$ here.\n\n$$\\frac{a}{b}$$");
    assert!(xml.contains("<m:oMath>"));
    assert!(xml.contains("<m:oMathPara>"));
    assert!(xml.contains("<m:f>"));
    assert!(attribute_values(&xml, "jc", "val").contains(&"center".to_string()));
}

#[test]
fn test_unsupported_command_keeps_formula_source() {
    let xml = document_xml("Value $\\foo{x} + y$ here.");
    assert_eq!(element_count(&xml, "oMath"), 0);
    assert!(xml.contains("$\\foo{x} + y$"), "{xml}");
}

#[test]
fn test_math_normalizer_can_be_disabled() {
    let normalized = document_xml("angle \\theta here");
    assert!(normalized.contains("<m:oMath>"));

    let options = ExportOptions {
        normalize_math: false,
        ..ExportOptions::default()
    };
    let bytes = export_markdown("angle \\theta here", &options, &MemoryFetcher::default()).unwrap();
    let raw = part_text(&bytes, "word/document.xml");
    assert!(!raw.contains("<m:oMath>"));
    assert!(raw.contains("\\theta"));
}

#[test]
fn test_theme_fonts_from_option_map() {
    let map = HashMap::from([
        ("theme.body_font".to_string(), "Georgia".to_string()),
        ("theme.code_font".to_string(), "Menlo".to_string()),
    ]);
    let options = ExportOptions::from_options(&map).unwrap();
    let bytes = export_markdown("text", &options, &MemoryFetcher::default()).unwrap();

    let styles = part_text(&bytes, "word/styles.xml");
    assert!(attribute_values(&styles, "rFonts", "ascii").contains(&"Georgia".to_string()));
    assert!(attribute_values(&styles, "rFonts", "ascii").contains(&"Menlo".to_string()));
}

#[test]
fn test_unknown_export_options_are_rejected() {
    let map = HashMap::from([("paper".to_string(), "a4".to_string())]);
    let err = ExportOptions::from_options(&map).unwrap_err();
    assert!(matches!(err, FormatError::NotSupported(_)));
    assert!(err.to_string().contains("paper"));
}

#[test]
fn test_table_header_is_shaded() {
    let xml = document_xml("| a | b |\n| --- | --- |\n| 1 | 2 |");
    assert_eq!(element_count(&xml, "tbl"), 1);
    assert_eq!(element_count(&xml, "tr"), 2);
    assert_eq!(attribute_values(&xml, "shd", "fill"), vec!["EEF2FF", "EEF2FF"]);
    assert_eq!(attribute_values(&xml, "tcW", "w"), vec!["2500"; 4]);
    assert_eq!(attribute_values(&xml, "tcW", "type"), vec!["pct"; 4]);
}

#[test]
fn test_links_become_external_relationships() {
    let bytes = export("[a](https://example.com) and [c](#top)");
    let rels = part_text(&bytes, "word/_rels/document.xml.rels");
    assert!(attribute_values(&rels, "Relationship", "Target")
        .contains(&"https://example.com".to_string()));
    assert!(rels.contains(r#"TargetMode="External""#));

    let document = part_text(&bytes, "word/document.xml");
    assert_eq!(attribute_values(&document, "hyperlink", "anchor"), vec!["top"]);
}

#[test]
fn test_code_and_quotes_use_paragraph_styles() {
    let xml = document_xml("> quoted\n\n```\nlet x = 1;\n```\n\nsome `inline` code");
    let styles = attribute_values(&xml, "pStyle", "val");
    assert!(styles.contains(&"BlockQuote".to_string()));
    assert!(styles.contains(&"CodeBlock".to_string()));
    assert_eq!(attribute_values(&xml, "rStyle", "val"), vec!["InlineCode"]);
}

#[test]
fn test_thematic_break_has_a_bottom_border() {
    let xml = document_xml("a\n\n---\n\nb");
    assert_eq!(element_count(&xml, "bottom"), 1);
    assert_eq!(attribute_values(&xml, "bottom", "color"), vec!["CBD5F5"]);
}

#[test]
fn test_special_characters_are_escaped() {
    let bytes = export("Fish & chips <b> \"quoted\"");
    assert!(integrity_issues(&bytes).is_empty());
    let xml = part_text(&bytes, "word/document.xml");
    assert!(xml.contains("&amp;"));
    assert!(xml.contains("&lt;b&gt;"));
}

#[test]
fn test_prose_mentioning_undefined_attributes_exports() {
    let bytes = export("Set `<input val=\"undefined\">` in the form.");
    assert!(integrity_issues(&bytes).is_empty());
    let xml = part_text(&bytes, "word/document.xml");
    assert!(xml.contains("undefined"));
}
