//! Math notation normalizer, end to end

use markdocx_babel::normalize_math;
use proptest::prelude::*;

#[test]
fn test_chat_style_answer() {
    let input = "The area is (\\pi r^2), so\n[\n\\int_0^r 2\\pi t\\,dt\n]\nand `\\pi` stays code.";
    assert_eq!(
        normalize_math(input),
        "The area is $\\pi r^2$, so\n$$\n\\int_0^r 2\\pi t\\,dt\n$$\nand `\\pi` stays code."
    );
}

#[test]
fn test_canonical_output_is_stable() {
    let inputs = [
        "Intro\n[\n\\int_0^1 x\\,dx\n]\nAfter",
        "  [\n  a + \\beta\n  ].",
        "[ \\alpha + 1 ]",
        "where (\\frac{a}{b}) is a ratio",
        "f(\\alpha)",
        "point ((1, 2))",
        "angle \\theta here",
        "inline \\( x^2 \\) end",
        "\\[ \\sum x \\]",
        "see \\[1\\] here",
    ];
    for input in inputs {
        let once = normalize_math(input);
        assert_eq!(normalize_math(&once), once, "not stable for {input:?}");
    }
}

#[test]
fn test_links_and_task_items_are_not_math() {
    let input = "- [x] done\n- [see](https://example.com) (a, b)";
    assert_eq!(normalize_math(input), input);
}

fn prose_line() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "word", "x", "(x + y)", "((1, 2))", " ", ", ", "x_1", "*em*", "1.",
        ]),
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

fn code_body() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "\\alpha", "(\\beta)", "[", "]", "\\[ x \\]", "$z$", "((3, 4))", "\\(q\\)", "plain",
        ]),
        1..5,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn math_line() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "\\alpha", "\\frac{a}{b}", "\\", "$", "$$", "(", ")", "[", "]", "{", "}", "\\(",
            "\\)", "\\[", "\\]", "_", "^", "x", " ",
        ]),
        0..16,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_normalizing_twice_changes_nothing(text in "[a-z \\\\$\\[\\](){}^_]{0,40}") {
        let once = normalize_math(&text);
        prop_assert_eq!(normalize_math(&once), once);
    }

    #[test]
    fn prop_normalizing_math_fragments_twice_changes_nothing(text in math_line()) {
        let once = normalize_math(&text);
        prop_assert_eq!(normalize_math(&once), once);
    }

    #[test]
    fn prop_text_without_math_markers_is_unchanged(text in "[a-zA-Z0-9 ,.;:!?*_#\n-]{0,80}") {
        prop_assert_eq!(normalize_math(&text), text);
    }

    #[test]
    fn prop_fenced_code_is_preserved(prose in prose_line(), code in code_body()) {
        let fenced = format!("```\n{code}\n```\n");
        let input = format!("{prose}\n{fenced}");
        let output = normalize_math(&input);
        prop_assert!(output.ends_with(&fenced), "code changed in {:?}", output);
    }

    #[test]
    fn prop_crlf_line_endings_are_normalised(lines in prop::collection::vec("[a-z \\\\()]{0,20}", 1..6)) {
        prop_assert!(!normalize_math(&lines.join("\r\n")).contains('\r'));
    }
}
