//! CLI-specific transforms
//!
//! This module defines the views `markdocx inspect` can print. Each transform is a
//! stage + format combination (e.g., "md-json", "docx-parts").
//!
//! ## Transform Pipeline
//!
//! 1. **Normalization** - Markdown text → Markdown text with canonical math delimiters
//!    - `md-normalized`: the normalizer output, exactly what the exporter parses
//!
//! 2. **Parsing** - Markdown text → node tree
//!    - `md-json`: the node tree as pretty-printed JSON
//!
//! 3. **Packaging** - DOCX bytes → parts
//!    - `docx-parts`: package entries and the main document's relationship table
//!
//! ## Extra Parameters
//!
//! - `normalize_math`: "false" makes `md-json` parse the raw text instead of the normalized
//!   one. Defaults to the export configuration.
//!
//! Example: `markdocx inspect notes.md md-json --extra-normalize_math false`

use markdocx_babel::formats::docx::describe_package;
use markdocx_babel::{normalize_math, parse_markdown};
use std::collections::HashMap;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &["md-json", "md-normalized", "docx-parts"];

/// One-line description of each transform, in [`AVAILABLE_TRANSFORMS`] order
pub const TRANSFORM_DESCRIPTIONS: &[(&str, &str)] = &[
    ("md-json", "Parsed Markdown node tree as JSON"),
    ("md-normalized", "Markdown after math notation normalization"),
    ("docx-parts", "Package parts and relationships of a .docx file"),
];

/// Transform used when none is given: `docx-parts` for packages, `md-json` otherwise.
pub fn default_transform(path: &str) -> &'static str {
    if path.to_ascii_lowercase().ends_with(".docx") {
        "docx-parts"
    } else {
        "md-json"
    }
}

/// Execute a named transform on a source file with optional extra parameters
///
/// # Arguments
///
/// * `source` - The raw bytes of the input file
/// * `transform_name` - The transform to apply (e.g., "md-json", "docx-parts")
/// * `extra_params` - Optional parameters for the transform
///
/// # Returns
///
/// The transformed output as a string, or an error message
pub fn execute_transform(
    source: &[u8],
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    match transform_name {
        "md-json" => {
            let text = markdown_text(source)?;
            let text = if normalize_enabled(extra_params)? {
                normalize_math(&text)
            } else {
                text
            };
            let tree = parse_markdown(&text);
            let json = serde_json::to_string_pretty(&tree)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            Ok(format!("{json}\n"))
        }
        "md-normalized" => Ok(normalize_math(&markdown_text(source)?)),
        "docx-parts" => describe_package(source).map_err(|e| e.to_string()),
        _ => Err(format!(
            "Unknown transform '{transform_name}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn markdown_text(source: &[u8]) -> Result<String, String> {
    let text =
        std::str::from_utf8(source).map_err(|e| format!("Input is not valid UTF-8: {e}"))?;
    Ok(text.replace("\r\n", "\n"))
}

fn normalize_enabled(params: &HashMap<String, String>) -> Result<bool, String> {
    match params.get("normalize_math").map(|v| v.to_lowercase()) {
        None => Ok(true),
        Some(value) => match value.as_str() {
            "" | "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => Err(format!(
                "Invalid boolean value '{other}' for --extra-normalize_math"
            )),
        },
    }
}
