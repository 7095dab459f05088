//! Markdown → DOCX → Markdown

use crate::common::{png, roundtrip};
use base64::Engine;
use insta::assert_snapshot;
use markdocx_babel::formats::docx::SourceFetcher;
use markdocx_babel::{
    export_markdown, import_docx, ExportOptions, FormatRegistry, ImportOptions, SerializedDocument,
};
use std::collections::HashMap;

#[test]
fn test_kitchen_sink() {
    let source = r#"# Report

Intro with **bold**, *italic*, ~~gone~~ and `code`.

- alpha
- beta
  - nested

Steps:

1. one
2. two

> Quoted text

```rust
fn main() {}
```

$$\frac{a}{b}$$

| Name | Score |
| :--- | ---: |
| Ann | 10 |

---

Visit [site](https://example.com).
"#;

    assert_snapshot!(roundtrip(source), @r"
    # Report

    Intro with **bold**, *italic*, ~~gone~~ and `code`.

    - alpha
    - beta
      - nested

    Steps:

    1. one
    2. two

    > Quoted text

    ```
    fn main() {}
    ```

    $$
    \frac{a}{b}
    $$

    | Name | Score |
    | --- | ---: |
    | Ann | 10 |

    ---

    Visit [site](https://example.com).
    ");
}

#[test]
fn test_list_start_survives() {
    assert_eq!(roundtrip("3. a\n4. b"), "3. a\n4. b");
}

#[test]
fn test_continuation_paragraph_keeps_the_ordinals() {
    assert_eq!(
        roundtrip("1. one\n\n   more\n2. two"),
        "1. one\n\n   more\n\n2. two"
    );
}

#[test]
fn test_task_lists_survive() {
    assert_eq!(roundtrip("- [x] done\n- [ ] todo"), "- [x] done\n- [ ] todo");
}

#[test]
fn test_literal_markdown_characters_stay_literal() {
    assert_eq!(roundtrip(r"\*literal\*"), r"\*literal\*");
}

#[test]
fn test_pipe_in_cell_code_keeps_the_row_shape() {
    let source = "| a | b |\n| --- | --- |\n| `x\\|y` | z |";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn test_inline_math_survives() {
    assert_eq!(roundtrip("Area $r^{2}$ here"), "Area $r^{2}$ here");
}

#[test]
fn test_embedded_image_survives_as_data_url() {
    let data_url = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png(150, 150))
    );
    let markdown = format!("![dot]({data_url})");

    let options = ExportOptions::default();
    let fetcher = SourceFetcher::new(&options.images);
    let bytes = export_markdown(&markdown, &options, &fetcher).unwrap();
    let back = import_docx(&bytes, &ImportOptions::default()).unwrap();

    // The bitmap is re-encoded on the way in, so compare what it decodes to.
    let payload = back
        .strip_prefix("![dot](data:image/png;base64,")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or_else(|| panic!("unexpected image markdown: {back}"));
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    let img = image::load_from_memory(&decoded).unwrap();
    assert_eq!((img.width(), img.height()), (150, 150));
}

#[test]
fn test_registry_round_trip() {
    let registry = FormatRegistry::default();
    let serialized = registry
        .serialize_with_options("## Hello\n\nWorld", "docx", &HashMap::new())
        .unwrap();
    let SerializedDocument::Binary(bytes) = serialized else {
        panic!("docx serializes to binary");
    };
    assert_eq!(registry.parse(&bytes, "docx").unwrap(), "## Hello\n\nWorld");
}
