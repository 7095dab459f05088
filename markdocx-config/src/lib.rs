//! Shared configuration loader for the markdocx toolchain.
//!
//! `defaults/markdocx.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MarkdocxConfig`].
//!
//! The conversion library takes its options as a flat string map (the same shape as the
//! CLI's `--extra-<key> <value>` arguments). [`ExportConfig::to_options`] and
//! [`ImportConfig::to_options`] produce that map from a loaded configuration.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use markdocx_babel::formats::docx::{ImageOptions, Theme};
use markdocx_babel::{ExportOptions, ImportOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/markdocx.default.toml");

/// Name of the optional per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = "markdocx.toml";

/// Top-level configuration consumed by markdocx applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdocxConfig {
    pub export: ExportConfig,
    pub import: ImportConfig,
}

/// Markdown → DOCX knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub normalize_math: bool,
    pub default_file_name: String,
    pub images: ImagesConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub fetch_remote: bool,
    pub timeout_secs: u64,
    pub min_px: u32,
    pub max_px: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    pub body_font: String,
    pub code_font: String,
}

/// DOCX → Markdown knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub embed_images: bool,
}

impl ExportConfig {
    /// Option map understood by the `docx` format's `serialize_with_options`.
    ///
    /// `default_file_name` is an application setting and is not part of the map.
    pub fn to_options(&self) -> HashMap<String, String> {
        let entries = [
            ("normalize_math", self.normalize_math.to_string()),
            ("images.fetch_remote", self.images.fetch_remote.to_string()),
            ("images.timeout_secs", self.images.timeout_secs.to_string()),
            ("images.min_px", self.images.min_px.to_string()),
            ("images.max_px", self.images.max_px.to_string()),
            ("theme.body_font", self.theme.body_font.clone()),
            ("theme.code_font", self.theme.code_font.clone()),
        ];
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

impl ImportConfig {
    /// Option map understood by the `docx` format's `parse_with_options`.
    pub fn to_options(&self) -> HashMap<String, String> {
        HashMap::from([("embed_images".to_string(), self.embed_images.to_string())])
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        ExportOptions {
            normalize_math: config.normalize_math,
            images: ImageOptions {
                fetch_remote: config.images.fetch_remote,
                timeout_secs: config.images.timeout_secs,
                min_px: config.images.min_px,
                max_px: config.images.max_px,
                base_dir: None,
            },
            theme: Theme {
                body_font: config.theme.body_font.clone(),
                code_font: config.theme.code_font.clone(),
            },
        }
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        ImportOptions {
            embed_images: config.embed_images,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MarkdocxConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MarkdocxConfig, ConfigError> {
    Loader::new().build()
}
