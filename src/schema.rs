//! Structural checks on a parsed report.
//!
//! Only presence of the required containers is verified; element content
//! is left to the extractor's defaulting.

use crate::document::ParsedDocument;
use crate::error::{ReportError, Result};

pub const REASON_EMPTY: &str = "Document is empty";
pub const REASON_NO_FEEDBACK: &str = "Missing root <feedback> element";
pub const REASON_NO_METADATA: &str = "Missing <report_metadata> element in <feedback>";

/// Outcome of checking a document's shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    /// Convert a failed check into [`ReportError::Validation`]
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ReportError::Validation {
                reason: self.reason.unwrap_or_else(|| "Unknown reason".to_string()),
            })
        }
    }
}

/// Check, in order, that the document is non-empty, rooted at `feedback`,
/// and carries `report_metadata`. Stops at the first failure.
pub fn validate_document(doc: &ParsedDocument) -> ValidationResult {
    let Some(root) = doc.root() else {
        return ValidationResult::invalid(REASON_EMPTY);
    };
    if root.name() != "feedback" {
        return ValidationResult::invalid(REASON_NO_FEEDBACK);
    }
    if root.child("report_metadata").is_none() {
        return ValidationResult::invalid(REASON_NO_METADATA);
    }
    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{XmlNode, parse_document};

    #[test]
    fn test_valid_document() {
        let doc = parse_document("<feedback><report_metadata/></feedback>").unwrap();
        let result = validate_document(&doc);
        assert!(result.valid);
        assert_eq!(result.reason, None);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_empty_document() {
        let result = validate_document(&ParsedDocument::empty());
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some(REASON_EMPTY));
    }

    #[test]
    fn test_missing_feedback_root() {
        let doc = parse_document("<report><report_metadata/></report>").unwrap();
        let result = validate_document(&doc);
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some(REASON_NO_FEEDBACK));
    }

    #[test]
    fn test_missing_report_metadata() {
        let doc = ParsedDocument::from_root(
            XmlNode::new("feedback").with_child(XmlNode::new("record")),
        );
        let result = validate_document(&doc);
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some(REASON_NO_METADATA));
    }

    #[test]
    fn test_reasons_are_distinguishable() {
        let no_root = validate_document(&parse_document("<other/>").unwrap());
        let no_meta = validate_document(&parse_document("<feedback/>").unwrap());
        assert_ne!(no_root.reason, no_meta.reason);
    }

    #[test]
    fn test_into_result_carries_reason() {
        let err = ValidationResult::invalid(REASON_NO_METADATA)
            .into_result()
            .unwrap_err();
        match err {
            ReportError::Validation { reason } => assert_eq!(reason, REASON_NO_METADATA),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
