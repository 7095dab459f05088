//! Package images → `data:` URLs, memoized per import by relationship id.

use super::relationships::{has_scheme, resolve_part_path, Relationships};
use crate::formats::docx::package::PackageReader;
use base64::Engine;
use log::warn;
use std::collections::HashMap;

pub struct ImageResolver<'a> {
    package: PackageReader<'a>,
    cache: HashMap<String, Option<String>>,
}

impl<'a> ImageResolver<'a> {
    pub fn new(package: PackageReader<'a>) -> Self {
        ImageResolver {
            package,
            cache: HashMap::new(),
        }
    }

    /// Data URL for an image relationship. External, missing and unreadable targets yield
    /// `None`.
    pub fn resolve(&mut self, relationships: &Relationships, rel_id: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(rel_id) {
            return cached.clone();
        }
        let resolved = self.load(relationships, rel_id);
        self.cache.insert(rel_id.to_string(), resolved.clone());
        resolved
    }

    fn load(&mut self, relationships: &Relationships, rel_id: &str) -> Option<String> {
        let rel = relationships.get(rel_id)?;
        if !rel.is_image() || rel.external || has_scheme(&rel.target) {
            return None;
        }
        let path = resolve_part_path(&rel.target);
        let data = match self.package.read_bytes(&path) {
            Ok(Some(data)) => data,
            Ok(None) => {
                warn!("Image part {path} referenced by {rel_id} is missing");
                return None;
            }
            Err(e) => {
                warn!("Could not read image part {path}: {e}");
                return None;
            }
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Some(format!("data:{};base64,{encoded}", mime_for_path(&path)))
    }

    /// Number of relationship ids resolved so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// MIME type inferred from a part name's extension
pub fn mime_for_path(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
