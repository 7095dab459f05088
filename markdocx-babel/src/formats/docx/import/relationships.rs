//! `word/_rels/document.xml.rels`: relationship id → target.

use crate::ir::xml::parse_xml;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub target: String,
    /// Relationship type URI
    pub kind: String,
    /// `TargetMode="External"`
    pub external: bool,
}

impl Relationship {
    pub fn is_image(&self) -> bool {
        self.kind.contains("/image")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: HashMap<String, Relationship>,
}

impl Relationships {
    /// Parse the relationships part. An absent or malformed part yields an empty table.
    pub fn parse(xml: Option<&str>) -> Self {
        let Some(xml) = xml else {
            return Self::default();
        };
        let root = match parse_xml(xml) {
            Ok(root) => root,
            Err(e) => {
                warn!("Ignoring unreadable document relationships: {e}");
                return Self::default();
            }
        };

        let entries = root
            .children_named("Relationship")
            .filter_map(|rel| {
                let id = rel.attr("Id")?;
                let target = rel.attr("Target")?;
                let kind = rel.attr("Type")?;
                Some((
                    id.to_string(),
                    Relationship {
                        target: target.to_string(),
                        kind: kind.to_string(),
                        external: rel
                            .attr("TargetMode")
                            .is_some_and(|mode| mode.eq_ignore_ascii_case("external")),
                    },
                ))
            })
            .collect();
        Relationships { entries }
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by id
    pub fn sorted(&self) -> Vec<(&str, &Relationship)> {
        let mut entries: Vec<(&str, &Relationship)> = self
            .entries
            .iter()
            .map(|(id, rel)| (id.as_str(), rel))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Whether a target carries a URL scheme (`https:`, `mailto:`, ...)
pub fn has_scheme(target: &str) -> bool {
    match target.split_once(':') {
        Some((scheme, _)) => !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}

/// Resolve a relationship target against the `word/` part directory.
pub fn resolve_part_path(target: &str) -> String {
    let normalized = target.replace('\\', "/");
    let normalized = normalized.strip_prefix("./").unwrap_or(&normalized);
    if has_scheme(normalized) {
        return normalized.to_string();
    }
    if let Some(absolute) = normalized.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut stack = vec!["word"];
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            segment => stack.push(segment),
        }
    }
    stack.join("/")
}
