//! `word/styles.xml`: style id → display name, outline level and type.

use crate::ir::xml::parse_xml;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleInfo {
    pub name: Option<String>,
    /// `w:outlineLvl` from the style's paragraph properties (0 = top level)
    pub outline_level: Option<u32>,
    /// `paragraph`, `character`, `table` or `numbering`
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: HashMap<String, StyleInfo>,
}

impl StyleTable {
    /// Parse the styles part. An absent or malformed part yields an empty table.
    pub fn parse(xml: Option<&str>) -> Self {
        let Some(xml) = xml else {
            return Self::default();
        };
        let root = match parse_xml(xml) {
            Ok(root) => root,
            Err(e) => {
                warn!("Ignoring unreadable styles part: {e}");
                return Self::default();
            }
        };

        let styles = root
            .children_named("style")
            .filter_map(|style| {
                let id = style.attr("styleId")?;
                let outline_level = style
                    .child("pPr")
                    .and_then(|ppr| ppr.child("outlineLvl"))
                    .and_then(|lvl| lvl.attr("val"))
                    .and_then(|val| val.trim().parse().ok());
                Some((
                    id.to_string(),
                    StyleInfo {
                        name: style
                            .child("name")
                            .and_then(|name| name.attr("val"))
                            .map(str::to_string),
                        outline_level,
                        kind: style.attr("type").map(str::to_string),
                    },
                ))
            })
            .collect();
        StyleTable { styles }
    }

    pub fn get(&self, id: &str) -> Option<&StyleInfo> {
        self.styles.get(id)
    }
}
