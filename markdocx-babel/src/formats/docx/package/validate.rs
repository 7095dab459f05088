//! Post-build integrity check.
//!
//! A package is only handed back to the caller after it has been reopened and its main
//! document parsed and searched for the signatures of an incomplete XML import.

use super::PackageReader;
use crate::error::{FormatError, IntegrityIssue};
use roxmltree::Document;

const REQUIRED_ENTRIES: [&str; 2] = ["[Content_Types].xml", "word/document.xml"];
const UNDEFINED: &str = "undefined";

/// Collect every integrity problem of a package. An empty list means the package is sound.
pub fn integrity_issues(bytes: &[u8]) -> Vec<IntegrityIssue> {
    let mut reader = match PackageReader::open(bytes) {
        Ok(reader) => reader,
        Err(e) => return vec![IntegrityIssue::UnreadableArchive(e.to_string())],
    };

    let mut issues: Vec<IntegrityIssue> = REQUIRED_ENTRIES
        .iter()
        .filter(|entry| !reader.contains(entry))
        .map(|entry| IntegrityIssue::MissingEntry(entry.to_string()))
        .collect();

    match reader.read_text("word/document.xml") {
        Ok(Some(document)) => issues.extend(document_issues(&document)),
        Ok(None) => {}
        Err(e) => issues.push(IntegrityIssue::UnreadableArchive(e.to_string())),
    }

    issues
}

/// Signatures are looked for in element names and attribute values only; the same word in
/// run text is content.
fn document_issues(document: &str) -> Vec<IntegrityIssue> {
    let parsed = match Document::parse(document) {
        Ok(parsed) => parsed,
        Err(e) => return vec![IntegrityIssue::MalformedDocument(e.to_string())],
    };

    let elements: Vec<_> = parsed.descendants().filter(|n| n.is_element()).collect();
    let mut issues = Vec::new();
    if elements.iter().any(|n| n.tag_name().name() == UNDEFINED) {
        issues.push(IntegrityIssue::UndefinedElement);
    }
    if elements
        .iter()
        .any(|n| n.attributes().any(|attr| attr.value() == UNDEFINED))
    {
        issues.push(IntegrityIssue::UndefinedAttribute);
    }
    issues
}

/// Fail with every tripped signature at once.
pub fn validate_package(bytes: &[u8]) -> Result<(), FormatError> {
    let issues = integrity_issues(bytes);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(FormatError::InvalidPackage(issues))
    }
}
