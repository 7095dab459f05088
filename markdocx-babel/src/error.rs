//! Error types for format operations

use std::fmt;

/// Errors that can occur during format operations
///
/// Only structural failures surface here. Per-node conversion problems (an image that
/// cannot be fetched, a formula that cannot be translated) degrade to a textual fallback
/// inside the converters and never reach the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// Error during parsing
    ParseError(String),
    /// Error during serialization
    SerializationError(String),
    /// Format does not support the requested operation
    NotSupported(String),
    /// A package part required for import is absent
    MissingPart(String),
    /// The produced package failed the post-build integrity check
    InvalidPackage(Vec<IntegrityIssue>),
}

/// A single signature tripped by the package integrity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// The package bytes could not be re-opened as a ZIP archive
    UnreadableArchive(String),
    /// A required entry is missing from the archive
    MissingEntry(String),
    /// The main document is not well-formed XML
    MalformedDocument(String),
    /// The main document contains a literal `<undefined` element
    UndefinedElement,
    /// The main document contains an attribute valued `"undefined"`
    UndefinedAttribute,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::UnreadableArchive(msg) => write!(f, "archive cannot be read ({msg})"),
            IntegrityIssue::MissingEntry(entry) => write!(f, "missing required entry '{entry}'"),
            IntegrityIssue::MalformedDocument(msg) => {
                write!(f, "main document is not well-formed XML ({msg})")
            }
            IntegrityIssue::UndefinedElement => {
                write!(f, "found <undefined> elements (incomplete XML import)")
            }
            IntegrityIssue::UndefinedAttribute => {
                write!(f, "found attributes valued \"undefined\" in OMML content")
            }
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            FormatError::NotSupported(msg) => write!(f, "Operation not supported: {msg}"),
            FormatError::MissingPart(part) => {
                write!(f, "Invalid DOCX: the package does not contain {part}")
            }
            FormatError::InvalidPackage(issues) => {
                let details: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
                write!(f, "Invalid DOCX: {}", details.join("; "))
            }
        }
    }
}

impl std::error::Error for FormatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_package_lists_every_signature() {
        let err = FormatError::InvalidPackage(vec![
            IntegrityIssue::UndefinedElement,
            IntegrityIssue::UndefinedAttribute,
        ]);
        let message = err.to_string();
        assert!(message.starts_with("Invalid DOCX: "));
        assert!(message.contains("<undefined>"));
        assert!(message.contains("\"undefined\""));
    }

    #[test]
    fn missing_part_names_the_part() {
        let err = FormatError::MissingPart("word/document.xml".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid DOCX: the package does not contain word/document.xml"
        );
    }
}
