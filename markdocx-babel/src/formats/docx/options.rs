//! Typed export and import options.
//!
//! The CLI and the registry hand options around as a flat string map (`--extra-<key>
//! <value>`); the structs here give them types and defaults. The defaults mirror
//! `markdocx.default.toml` in the config crate.

use crate::error::FormatError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Export (Markdown → DOCX) settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Run the math notation normalizer before parsing
    pub normalize_math: bool,
    pub images: ImageOptions,
    pub theme: Theme,
}

/// How images referenced from Markdown are loaded and sized
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub fetch_remote: bool,
    pub timeout_secs: u64,
    pub min_px: u32,
    pub max_px: u32,
    /// Directory relative image paths are resolved against
    pub base_dir: Option<PathBuf>,
}

/// Fonts used by the generated styles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub body_font: String,
    pub code_font: String,
}

/// Import (DOCX → Markdown) settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Embed package images as data URLs; when false every image becomes `![alt]()`
    pub embed_images: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            normalize_math: true,
            images: ImageOptions::default(),
            theme: Theme::default(),
        }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        ImageOptions {
            fetch_remote: true,
            timeout_secs: 10,
            min_px: 120,
            max_px: 480,
            base_dir: None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            body_font: "Inter".to_string(),
            code_font: "Fira Code".to_string(),
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions { embed_images: true }
    }
}

const EXPORT_KEYS: &[&str] = &[
    "normalize_math",
    "images.fetch_remote",
    "images.timeout_secs",
    "images.min_px",
    "images.max_px",
    "images.base_dir",
    "theme.body_font",
    "theme.code_font",
];

const IMPORT_KEYS: &[&str] = &["embed_images"];

impl ExportOptions {
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, FormatError> {
        reject_unknown(options, EXPORT_KEYS)?;
        let defaults = ExportOptions::default();
        let image_defaults = defaults.images;

        let images = ImageOptions {
            fetch_remote: parse_bool_flag(
                options,
                "images.fetch_remote",
                image_defaults.fetch_remote,
            )?,
            timeout_secs: parse_number(options, "images.timeout_secs", image_defaults.timeout_secs)?,
            min_px: parse_number(options, "images.min_px", image_defaults.min_px)?,
            max_px: parse_number(options, "images.max_px", image_defaults.max_px)?,
            base_dir: options.get("images.base_dir").map(PathBuf::from),
        };

        if images.min_px > images.max_px {
            return Err(FormatError::SerializationError(format!(
                "images.min_px ({}) must not exceed images.max_px ({})",
                images.min_px, images.max_px
            )));
        }

        let theme = Theme {
            body_font: options
                .get("theme.body_font")
                .cloned()
                .unwrap_or(defaults.theme.body_font),
            code_font: options
                .get("theme.code_font")
                .cloned()
                .unwrap_or(defaults.theme.code_font),
        };

        Ok(ExportOptions {
            normalize_math: parse_bool_flag(options, "normalize_math", defaults.normalize_math)?,
            images,
            theme,
        })
    }
}

impl ImportOptions {
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, FormatError> {
        reject_unknown(options, IMPORT_KEYS)?;
        Ok(ImportOptions {
            embed_images: parse_bool_flag(
                options,
                "embed_images",
                ImportOptions::default().embed_images,
            )?,
        })
    }
}

fn reject_unknown(options: &HashMap<String, String>, known: &[&str]) -> Result<(), FormatError> {
    let mut unknown: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(FormatError::NotSupported(format!(
        "Format 'docx' does not support the parameter(s): {}",
        unknown.join(", ")
    )))
}

fn parse_bool_flag(
    options: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, FormatError> {
    if let Some(value) = options.get(key) {
        if value.is_empty() {
            return Ok(true);
        }
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => Err(FormatError::SerializationError(format!(
                "Invalid boolean value '{other}' for --extra-{key}"
            ))),
        }
    } else {
        Ok(default)
    }
}

fn parse_number<T: std::str::FromStr>(
    options: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, FormatError> {
    match options.get(key) {
        Some(value) => value.trim().parse().map_err(|_| {
            FormatError::SerializationError(format!(
                "Invalid numeric value '{value}' for --extra-{key}"
            ))
        }),
        None => Ok(default),
    }
}
