//! List numbering resolution for the reverse converter.
//!
//! Word stores list membership as a `(numId, ilvl)` pair on each paragraph and leaves the
//! actual ordinal to be computed at render time. Rebuilding Markdown markers therefore means
//! replaying those counters in document order.
//!
//! # The Algorithm
//!
//! 1. **Identity check:** the counter key is `"numId:level"`. If the key active at the item's
//!    level differs from the item's key, the level switches to the new key and its counter is
//!    reset to `start - 1`.
//!
//! 2. **Pruning deeper levels:** every level deeper than the item's level is deactivated and
//!    its counter dropped, so a nested list never resumes after a shallower item.
//!
//! 3. **Advance:** the counter for the key is incremented and rendered with the level's
//!    format. Bullet levels still advance even though the value is never shown.
//!
//! 4. **Reset:** the caller clears the whole state whenever a non-list block interrupts the
//!    list run. An indented paragraph continuing an item is not an interruption; it reads
//!    the content column of the item it belongs to instead.

use std::collections::{BTreeMap, HashMap};

/// Marker format of a numbering level, as declared by `w:numFmt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Bullet,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerLetter,
    UpperLetter,
}

impl NumberFormat {
    /// Parse a `w:numFmt` value. Formats that have no Markdown rendering fall back to decimal.
    pub fn from_word(value: &str) -> Self {
        match value {
            "bullet" => NumberFormat::Bullet,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperRoman" => NumberFormat::UpperRoman,
            "lowerLetter" => NumberFormat::LowerLetter,
            "upperLetter" => NumberFormat::UpperLetter,
            _ => NumberFormat::Decimal,
        }
    }
}

/// Resolved list membership of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInfo {
    pub num_id: String,
    pub level: usize,
    pub format: NumberFormat,
    pub start: u32,
}

/// Running ordinal counters for one body conversion.
#[derive(Debug, Default)]
pub struct ListCounters {
    counters: HashMap<String, u32>,
    active: BTreeMap<usize, String>,
    /// Content column of the last line rendered at each level
    columns: BTreeMap<usize, usize>,
}

impl ListCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every counter, so the next list item starts a fresh run.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.active.clear();
        self.columns.clear();
    }

    /// Advance the counter for `info` and return its new ordinal.
    pub fn next(&mut self, info: &ListInfo) -> u32 {
        let key = format!("{}:{}", info.num_id, info.level);
        let base = info.start.saturating_sub(1);

        if self.active.get(&info.level) != Some(&key) {
            self.active.insert(info.level, key.clone());
            self.counters.insert(key.clone(), base);
        }

        let deeper = self.active.split_off(&(info.level + 1));
        for stale in deeper.values() {
            self.counters.remove(stale);
        }

        let counter = self.counters.entry(key).or_insert(base);
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Render a complete Markdown list line for `text`.
    pub fn render_line(&mut self, info: &ListInfo, text: &str) -> String {
        let value = self.next(info);
        let indent = "  ".repeat(info.level);
        let marker = match info.format {
            NumberFormat::Bullet => "-".to_string(),
            format => ordered_marker(format, value),
        };
        self.columns.retain(|level, _| *level < info.level);
        self.columns.insert(info.level, indent.len() + marker.len() + 1);
        format!("{indent}{marker} {text}")
    }

    /// Content column of the innermost running item at or above `level`, or `None` when no
    /// list is running.
    pub fn continuation_column(&self, level: usize) -> Option<usize> {
        self.columns
            .range(..=level)
            .next_back()
            .or_else(|| self.columns.iter().next())
            .map(|(_, column)| *column)
    }
}

/// Marker for an ordered item, including the trailing period.
pub fn ordered_marker(format: NumberFormat, value: u32) -> String {
    match format {
        NumberFormat::LowerRoman => format!("{}.", to_roman(value).to_lowercase()),
        NumberFormat::UpperRoman => format!("{}.", to_roman(value)),
        NumberFormat::LowerLetter => format!("{}.", to_alpha(value, false)),
        NumberFormat::UpperLetter => format!("{}.", to_alpha(value, true)),
        NumberFormat::Bullet | NumberFormat::Decimal => format!("{value}."),
    }
}

/// Upper-case Roman numeral. Values below 1 render as `I`.
pub fn to_roman(value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut remainder = value.max(1);
    let mut out = String::new();
    for (decimal, numeral) in NUMERALS {
        while remainder >= decimal {
            out.push_str(numeral);
            remainder -= decimal;
        }
    }
    out
}

/// Bijective base-26 letters: 1 → `a`, 26 → `z`, 27 → `aa`. Values below 1 render as `a`.
pub fn to_alpha(value: u32, uppercase: bool) -> String {
    let base = if uppercase { b'A' } else { b'a' };
    let mut index = value.max(1);
    let mut letters = Vec::new();
    while index > 0 {
        index -= 1;
        letters.push((base + (index % 26) as u8) as char);
        index /= 26;
    }
    letters.iter().rev().collect()
}
