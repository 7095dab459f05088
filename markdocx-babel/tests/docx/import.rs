//! Import tests (DOCX → Markdown)

use crate::common::{
    import, import_body, list_paragraph, paragraph, PackageBuilder, HYPERLINK_REL, IMAGE_REL,
};
use insta::assert_snapshot;
use markdocx_babel::{import_docx, FormatError, ImportOptions};

const DECIMAL_LIST: &str = r#"
    <w:abstractNum w:abstractNumId="0">
        <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
        <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%2."/></w:lvl>
    </w:abstractNum>
    <w:num w:numId="5"><w:abstractNumId w:val="0"/></w:num>"#;

#[test]
fn test_missing_document_part_is_fatal() {
    let bytes = PackageBuilder::new()
        .part("[Content_Types].xml", "<Types/>")
        .part("word/styles.xml", "<w:styles/>")
        .build();

    let err = import_docx(&bytes, &ImportOptions::default()).unwrap_err();
    assert_eq!(err, FormatError::MissingPart("word/document.xml".to_string()));
    assert!(err.to_string().contains("word/document.xml"));
}

#[test]
fn test_non_zip_input_is_a_parse_error() {
    let err = import_docx(b"PK but not really", &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::ParseError(_)));
}

#[test]
fn test_optional_parts_may_be_missing() {
    assert_eq!(import_body(&paragraph("Just text")), "Just text");
}

#[test]
fn test_undecodable_optional_parts_count_as_missing() {
    let bytes = PackageBuilder::new()
        .body(&paragraph("hi"))
        .part("word/numbering.xml", vec![0xFF, 0xFE, 0x3C, 0x00])
        .part("word/styles.xml", vec![0xC3, 0x28])
        .part("word/_rels/document.xml.rels", vec![0xFF])
        .build();
    assert_eq!(import(&bytes), "hi");
}

#[test]
fn test_ordered_counters_survive_nested_runs() {
    let body: String = [(0, "a"), (0, "b"), (1, "c"), (1, "d"), (0, "e")]
        .iter()
        .map(|(level, text)| list_paragraph(5, *level, text))
        .collect();
    let bytes = PackageBuilder::new()
        .body(&body)
        .numbering(DECIMAL_LIST)
        .build();

    assert_snapshot!(import(&bytes), @r"
    1. a
    2. b
      1. c
      2. d
    3. e
    ");
}

#[test]
fn test_roman_and_alphabetic_markers() {
    let numbering = r#"
        <w:abstractNum w:abstractNumId="1">
            <w:lvl w:ilvl="0"><w:start w:val="4"/><w:numFmt w:val="upperRoman"/></w:lvl>
        </w:abstractNum>
        <w:abstractNum w:abstractNumId="2">
            <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/></w:lvl>
        </w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="1"/></w:num>
        <w:num w:numId="2">
            <w:abstractNumId w:val="2"/>
            <w:lvlOverride w:ilvl="0"><w:startOverride w:val="27"/></w:lvlOverride>
        </w:num>"#;
    let body = format!(
        "{}{}",
        list_paragraph(1, 0, "fourth"),
        list_paragraph(2, 0, "letters")
    );
    let bytes = PackageBuilder::new()
        .body(&body)
        .numbering(numbering)
        .build();

    assert_eq!(import(&bytes), "IV. fourth\naa. letters");
}

#[test]
fn test_interrupted_list_restarts() {
    let body = [
        list_paragraph(5, 0, "a"),
        list_paragraph(5, 0, "b"),
        paragraph("between"),
        list_paragraph(5, 0, "c"),
    ]
    .concat();
    let bytes = PackageBuilder::new()
        .body(&body)
        .numbering(DECIMAL_LIST)
        .build();

    assert_eq!(import(&bytes), "1. a\n2. b\n\nbetween\n\n1. c");
}

#[test]
fn test_indented_paragraph_continues_the_item() {
    let body = [
        list_paragraph(5, 0, "one"),
        r#"<w:p><w:pPr><w:ind w:left="720"/></w:pPr><w:r><w:t>more</w:t></w:r></w:p>"#.to_string(),
        list_paragraph(5, 0, "two"),
        paragraph("after"),
        r#"<w:p><w:pPr><w:ind w:left="720"/></w:pPr><w:r><w:t>indented prose</w:t></w:r></w:p>"#.to_string(),
    ]
    .concat();
    let bytes = PackageBuilder::new()
        .body(&body)
        .numbering(DECIMAL_LIST)
        .build();

    assert_eq!(
        import(&bytes),
        "1. one\n\n   more\n\n2. two\n\nafter\n\nindented prose"
    );
}

#[test]
fn test_unknown_numbering_is_a_bullet_and_zero_is_plain() {
    let body = [
        list_paragraph(42, 0, "first"),
        list_paragraph(42, 1, "deeper"),
        list_paragraph(0, 0, "not a list"),
    ]
    .concat();
    assert_eq!(import_body(&body), "- first\n  - deeper\n\nnot a list");
}

#[test]
fn test_task_prefix_is_unescaped() {
    let body = [
        list_paragraph(9, 0, "[x] shipped"),
        list_paragraph(9, 0, "[ ] pending"),
    ]
    .concat();
    assert_eq!(import_body(&body), "- [x] shipped\n- [ ] pending");
}

#[test]
fn test_display_fraction() {
    let body = r#"<w:p><m:oMathPara><m:oMath><m:f><m:num><m:r><m:t>x</m:t></m:r></m:num><m:den><m:r><m:t>2</m:t></m:r></m:den></m:f></m:oMath></m:oMathPara></w:p>"#;
    assert_eq!(import_body(body), "$$\n\\frac{x}{2}\n$$");
}

#[test]
fn test_empty_numerator_defaults_to_one() {
    let body = r#"<w:p><m:oMathPara><m:oMath><m:f><m:num/><m:den><m:r><m:t>2</m:t></m:r></m:den></m:f></m:oMath></m:oMathPara></w:p>"#;
    assert_eq!(import_body(body), "$$\n\\frac{1}{2}\n$$");
}

#[test]
fn test_inline_formula_uses_dollars() {
    let body = r#"<w:p><w:r><w:t xml:space="preserve">Area </w:t></w:r><m:oMath><m:sSup><m:e><m:r><m:t>r</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup></m:oMath></w:p>"#;
    assert_eq!(import_body(body), "Area $r^{2}$");
}

#[test]
fn test_display_formula_beside_text_stays_inline() {
    let body = r#"<w:p><w:r><w:t xml:space="preserve">see </w:t></w:r><m:oMathPara><m:oMath><m:r><m:t>y</m:t></m:r></m:oMath></m:oMathPara></w:p>"#;
    assert_eq!(import_body(body), "see $y$");
}

#[test]
fn test_escaping_depends_on_code_style() {
    let body = concat!(
        r#"<w:p><w:r><w:t>*not bold*</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:rPr><w:rStyle w:val="InlineCode"/></w:rPr><w:t>*not bold*</w:t></w:r></w:p>"#,
    );
    assert_eq!(import_body(body), "\\*not bold\\*\n\n`*not bold*`");
}

#[test]
fn test_leading_markers_and_backslashes_are_escaped() {
    let body = [paragraph("# not a heading"), paragraph(r"C:\temp | x_y")].concat();
    assert_eq!(import_body(&body), "\\# not a heading\n\nC:\\\\temp \\| x\\_y");
}

#[test]
fn test_run_formatting() {
    let body = concat!(
        "<w:p>",
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>strong</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve"> </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:i/></w:rPr><w:t>em</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve"> </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>both</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve"> </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:strike/></w:rPr><w:t>old</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve"> </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>under</w:t></w:r>"#,
        r#"<w:r><w:rPr><w:vanish/></w:rPr><w:t>secret</w:t></w:r>"#,
        r#"<w:r><w:rPr><w:b w:val="false"/></w:rPr><w:t xml:space="preserve"> off</w:t></w:r>"#,
        "</w:p>"
    );
    assert_eq!(
        import_body(body),
        "**strong** *em* ***both*** ~~old~~ <u>under</u> off"
    );
}

#[test]
fn test_breaks_tabs_symbols_and_special_spaces() {
    let body = concat!(
        "<w:p><w:r>",
        "<w:t>a</w:t><w:br/><w:t>b</w:t><w:tab/><w:t>c</w:t>",
        r#"<w:sym w:font="Symbol" w:char="03B1"/>"#,
        "<w:t>\u{00A0}non\u{2011}breaking</w:t>",
        "</w:r></w:p>"
    );
    assert_eq!(import_body(body), "a  \nb    cα non-breaking");
}

#[test]
fn test_hyperlinks() {
    let body = concat!(
        "<w:p>",
        r#"<w:hyperlink r:id="rId9"><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>site</w:t></w:r></w:hyperlink>"#,
        r#"<w:r><w:t xml:space="preserve">, </w:t></w:r>"#,
        r#"<w:hyperlink w:anchor="intro"><w:r><w:t>top</w:t></w:r></w:hyperlink>"#,
        r#"<w:r><w:t xml:space="preserve">, </w:t></w:r>"#,
        r#"<w:fldSimple w:instr=" HYPERLINK &quot;https://docs.rs&quot; "><w:r><w:t>docs</w:t></w:r></w:fldSimple>"#,
        r#"<w:r><w:t xml:space="preserve">, </w:t></w:r>"#,
        r#"<w:hyperlink r:id="rId10"><w:r><w:t>file</w:t></w:r></w:hyperlink>"#,
        r#"<w:r><w:t xml:space="preserve">, </w:t></w:r>"#,
        r#"<w:hyperlink r:id="rId404"><w:r><w:t>dangling</w:t></w:r></w:hyperlink>"#,
        "</w:p>"
    );
    let bytes = PackageBuilder::new()
        .body(body)
        .relationships(&[
            ("rId9", HYPERLINK_REL, "https://example.com", true),
            ("rId10", HYPERLINK_REL, "attachments/report.pdf", false),
        ])
        .build();

    assert_eq!(
        import(&bytes),
        "[site](https://example.com), [top](#intro), [docs](https://docs.rs), [file](word/attachments/report.pdf), dangling"
    );
}

#[test]
fn test_code_paragraphs_merge_into_one_fence() {
    let body = concat!(
        r#"<w:p><w:pPr><w:pStyle w:val="SourceCode"/></w:pPr><w:r><w:t>let a = *b;</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="SourceCode"/></w:pPr><w:r><w:t>let c = 2;</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>done</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="HTMLMonospace"/></w:pPr><w:r><w:t>tail</w:t></w:r></w:p>"#,
    );
    assert_snapshot!(import_body(body), @r"
    ```
    let a = *b;
    let c = 2;
    ```

    done

    ```
    tail
    ```
    ");
}

#[test]
fn test_heading_resolution_order() {
    let styles = concat!(
        r#"<w:style w:type="paragraph" w:styleId="Titulo1"><w:name w:val="Título 1"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:pPr><w:outlineLvl w:val="4"/></w:pPr></w:style>"#,
    );
    let body = concat!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>By id</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="Titulo1"/></w:pPr><w:r><w:t>By style</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:outlineLvl w:val="2"/></w:pPr><w:r><w:t>By paragraph</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="heading9"/></w:pPr><w:r><w:t>Clamped</w:t></w:r></w:p>"#,
    );
    let bytes = PackageBuilder::new().body(body).styles(styles).build();

    assert_snapshot!(import(&bytes), @r"
    ## By id

    # By style

    ### By paragraph

    ###### Clamped
    ");
}

#[test]
fn test_block_quote_by_style_id_or_name() {
    let styles =
        r#"<w:style w:type="paragraph" w:styleId="Zitat"><w:name w:val="Cita destacada"/></w:style>"#;
    let body = concat!(
        r#"<w:p><w:pPr><w:pStyle w:val="IntenseQuote"/></w:pPr><w:r><w:t>by id</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="Zitat"/></w:pPr><w:r><w:t>by name</w:t><w:br/><w:t>second</w:t></w:r></w:p>"#,
    );
    let bytes = PackageBuilder::new().body(body).styles(styles).build();
    assert_eq!(import(&bytes), "> by id\n\n> by name\n> second");
}

#[test]
fn test_table_shape_alignment_and_padding() {
    let body = concat!(
        "<w:tbl><w:tblPr/>",
        "<w:tr>",
        r#"<w:tc><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Name</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t>Score</w:t></w:r></w:p></w:tc>"#,
        "</w:tr>",
        "<w:tr>",
        r#"<w:tc><w:p><w:r><w:t>Ann</w:t></w:r></w:p><w:p><w:r><w:t>Lee</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:r><w:t>a|b</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:r><w:t>extra</w:t></w:r></w:p></w:tc>"#,
        "</w:tr>",
        "</w:tbl>"
    );
    assert_snapshot!(import_body(body), @r"
    | Name | Score |  |
    | :---: | ---: | --- |
    | Ann<br>Lee | a\|b | extra |
    ");
}

#[test]
fn test_pipes_in_cell_code_and_math_are_escaped() {
    let code = r#"<w:r><w:rPr><w:rStyle w:val="InlineCode"/></w:rPr><w:t>x|y</w:t></w:r>"#;
    let body = format!(
        concat!(
            "<w:tbl>",
            "<w:tr><w:tc><w:p><w:r><w:t>Expr</w:t></w:r></w:p></w:tc></w:tr>",
            "<w:tr><w:tc><w:p>{code}</w:p></w:tc></w:tr>",
            "</w:tbl>",
            "<w:p>{code}</w:p>",
        ),
        code = code
    );
    assert_snapshot!(import_body(&body), @r"
    | Expr |
    | --- |
    | `x\|y` |

    `x|y`
    ");
}

#[test]
fn test_rule_and_empty_paragraphs() {
    let body = concat!(
        r#"<w:p><w:r><w:t>above</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="12" w:space="1" w:color="CBD5F5"/></w:pBdr></w:pPr></w:p>"#,
        "<w:p/>",
        r#"<w:p><w:r><w:t>below</w:t></w:r></w:p>"#,
    );
    assert_eq!(import_body(body), "above\n\n---\n\nbelow");
}

#[test]
fn test_content_controls_are_transparent() {
    let body = concat!(
        r#"<w:sdt><w:sdtPr><w:alias w:val="Block"/></w:sdtPr><w:sdtContent>"#,
        r#"<w:p><w:r><w:t>inside block</w:t></w:r></w:p>"#,
        "</w:sdtContent></w:sdt>",
        r#"<w:p><w:sdt><w:sdtContent><w:r><w:t>inside</w:t></w:r></w:sdtContent></w:sdt>"#,
        r#"<w:smartTag w:element="place"><w:r><w:t xml:space="preserve"> tag</w:t></w:r></w:smartTag></w:p>"#,
    );
    assert_eq!(import_body(body), "inside block\n\ninside tag");
}

#[test]
fn test_footnote_references() {
    let body = r#"<w:p><w:r><w:t>Claim</w:t></w:r><w:r><w:footnoteReference w:id="2"/></w:r></w:p>"#;
    assert_eq!(import_body(body), "Claim[^2]");
}

const DRAWING: &str = concat!(
    r#"<w:p><w:r><w:drawing><wp:inline>"#,
    r#"<wp:docPr id="1" name="Picture 1" descr="Chart"/>"#,
    r#"<a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId3"/></pic:blipFill></pic:pic></a:graphicData></a:graphic>"#,
    r#"</wp:inline></w:drawing></w:r></w:p>"#
);

fn image_package(with_media: bool) -> Vec<u8> {
    let builder = PackageBuilder::new()
        .body(DRAWING)
        .relationships(&[("rId3", IMAGE_REL, "media/image1.png", false)]);
    let builder = if with_media {
        builder.part("word/media/image1.png", b"abc".to_vec())
    } else {
        builder
    };
    builder.build()
}

#[test]
fn test_images_are_embedded_as_data_urls() {
    assert_eq!(
        import(&image_package(true)),
        "![Chart](data:image/png;base64,YWJj)"
    );
}

#[test]
fn test_unresolvable_images_degrade_to_empty_reference() {
    assert_eq!(import(&image_package(false)), "![Chart]()");
}

#[test]
fn test_image_embedding_can_be_disabled() {
    let options = ImportOptions {
        embed_images: false,
    };
    assert_eq!(
        import_docx(&image_package(true), &options).unwrap(),
        "![Chart]()"
    );
}

#[test]
fn test_image_alt_falls_back_to_title_then_default() {
    let titled = DRAWING.replace(r#"descr="Chart""#, r#"title="Titled""#);
    let untitled = DRAWING.replace(r#" descr="Chart""#, "");
    assert_eq!(import_body(&titled), "![Titled]()");
    assert_eq!(import_body(&untitled), "![image]()");
}
