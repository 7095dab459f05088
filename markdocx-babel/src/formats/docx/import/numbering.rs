//! `word/numbering.xml`: numbering instance → per-level format and start value.
//!
//! Each `w:num` points at a `w:abstractNum` that declares the levels; `w:lvlOverride`
//! entries with a `w:startOverride` replace the start value of one level for that instance.

use crate::common::numbering::{ListInfo, NumberFormat};
use crate::ir::xml::{parse_xml, XmlNode};
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingLevel {
    pub format: NumberFormat,
    pub start: u32,
}

type LevelMap = HashMap<usize, NumberingLevel>;

#[derive(Debug, Clone, Default)]
pub struct NumberingTable {
    instances: HashMap<String, LevelMap>,
}

fn parse_levels(abstract_num: &XmlNode) -> LevelMap {
    abstract_num
        .children_named("lvl")
        .map(|lvl| {
            let level = lvl
                .attr("ilvl")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
            let format = lvl
                .child("numFmt")
                .and_then(|f| f.attr("val"))
                .map_or(NumberFormat::Decimal, NumberFormat::from_word);
            let start = lvl
                .child("start")
                .and_then(|s| s.attr("val"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            (level, NumberingLevel { format, start })
        })
        .collect()
}

impl NumberingTable {
    /// Parse the numbering part. An absent or malformed part yields an empty table.
    pub fn parse(xml: Option<&str>) -> Self {
        let Some(xml) = xml else {
            return Self::default();
        };
        let root = match parse_xml(xml) {
            Ok(root) => root,
            Err(e) => {
                warn!("Ignoring unreadable numbering part: {e}");
                return Self::default();
            }
        };

        let abstracts: HashMap<&str, LevelMap> = root
            .children_named("abstractNum")
            .filter_map(|node| Some((node.attr("abstractNumId")?, parse_levels(node))))
            .collect();

        let mut instances = HashMap::new();
        for num in root.children_named("num") {
            let Some(num_id) = num.attr("numId") else {
                continue;
            };
            let Some(mut levels) = num
                .child("abstractNumId")
                .and_then(|a| a.attr("val"))
                .and_then(|id| abstracts.get(id))
                .cloned()
            else {
                continue;
            };

            for level_override in num.children_named("lvlOverride") {
                let Some(level) = level_override
                    .attr("ilvl")
                    .and_then(|v| v.trim().parse::<usize>().ok())
                else {
                    continue;
                };
                let Some(start) = level_override
                    .child("startOverride")
                    .and_then(|s| s.attr("val"))
                else {
                    continue;
                };
                let start = start.trim().parse().ok().filter(|&s| s > 0).unwrap_or(1);
                levels
                    .entry(level)
                    .and_modify(|info| info.start = start)
                    .or_insert(NumberingLevel {
                        format: NumberFormat::Decimal,
                        start,
                    });
            }

            instances.insert(num_id.to_string(), levels);
        }

        NumberingTable { instances }
    }

    /// List membership for a paragraph's `(numId, ilvl)`.
    ///
    /// `numId` 0 removes numbering and yields `None`. A numbering id or level the table does
    /// not know becomes a plain bullet at the requested level.
    pub fn resolve(&self, num_id: &str, level: usize) -> Option<ListInfo> {
        let num_id = num_id.trim();
        if num_id.is_empty() || num_id == "0" {
            return None;
        }
        let (format, start) = match self.instances.get(num_id).and_then(|l| l.get(&level)) {
            Some(info) => (info.format, info.start),
            None => {
                warn!("Unknown numbering {num_id} level {level}, rendering as bullet");
                (NumberFormat::Bullet, 1)
            }
        };
        Some(ListInfo {
            num_id: num_id.to_string(),
            level,
            format,
            start,
        })
    }
}
