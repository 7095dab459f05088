//! Markdown node tree, as exposed through its JSON form

use markdocx_babel::ir::nodes::MdNode;
use markdocx_babel::parse_markdown;
use serde_json::{json, Value};

fn tree(markdown: &str) -> Value {
    serde_json::to_value(parse_markdown(markdown)).unwrap()
}

#[test]
fn test_paragraph_with_emphasis() {
    assert_eq!(
        tree("Hi *there*"),
        json!({
            "type": "document",
            "children": [{
                "type": "paragraph",
                "children": [
                    { "type": "text", "value": "Hi " },
                    { "type": "emphasis", "children": [{ "type": "text", "value": "there" }] }
                ]
            }]
        })
    );
}

#[test]
fn test_table_alignments_serialize_lowercase() {
    let doc = tree("| a | b | c | d |\n| --- | :-- | :-: | --: |\n| 1 | 2 | 3 | 4 |");
    assert_eq!(
        doc["children"][0]["alignments"],
        json!(["none", "left", "center", "right"])
    );
    assert_eq!(doc["children"][0]["type"], "table");
    assert_eq!(doc["children"][0]["children"][1]["type"], "table-row");
}

#[test]
fn test_lists_and_tasks() {
    let doc = tree("5. five\n\n- [x] done");
    assert_eq!(doc["children"][0]["type"], "list");
    assert_eq!(doc["children"][0]["ordered"], true);
    assert_eq!(doc["children"][0]["start"], 5);
    assert_eq!(doc["children"][1]["children"][0]["type"], "list-item");
    assert_eq!(doc["children"][1]["children"][0]["checked"], true);
}

#[test]
fn test_links_images_and_breaks() {
    let doc = parse_markdown("[go](https://a.example) ![alt *text*](pic.png)  \nnext");
    let MdNode::Document { children } = &doc else {
        panic!("expected a document");
    };
    let inlines = children[0].children();

    assert!(matches!(&inlines[0], MdNode::Link { url, .. } if url == "https://a.example"));
    assert!(inlines.contains(&MdNode::Image {
        url: "pic.png".to_string(),
        alt: "alt text".to_string(),
    }));
    assert!(inlines.contains(&MdNode::LineBreak));
}

#[test]
fn test_display_math_alone_in_paragraph_is_a_block() {
    let doc = tree("$$x + y$$");
    assert_eq!(
        doc["children"][0],
        json!({ "type": "math-block", "value": "x + y" })
    );
}

#[test]
fn test_html_is_kept_verbatim() {
    let doc = tree("<div>raw</div>");
    assert_eq!(
        doc["children"][0],
        json!({ "type": "html", "value": "<div>raw</div>" })
    );
}

#[test]
fn test_parsing_is_total() {
    for source in ["", "\n\n\n", "```", "| a |", "[", "$$", "> > >"] {
        assert!(matches!(parse_markdown(source), MdNode::Document { .. }));
    }
}
