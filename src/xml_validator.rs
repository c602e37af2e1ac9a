//! Combined document check: structure first, then content.

use serde::{Deserialize, Serialize};

use crate::content::{validate_datatypes, validate_enum_values};
use crate::hash::compute_content_hash;
use crate::issue::{IssueCategory, IssueCode, ValidationIssue};
use crate::namespaces::{ExtensionSummary, NamespaceDecl, detect_extensions, detect_namespaces};
use crate::well_formed::check_well_formed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlValidationReport {
    pub valid: bool,
    pub well_formed: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub namespaces: Vec<NamespaceDecl>,
    pub extensions: ExtensionSummary,
    pub content_hash: String,
}

impl XmlValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Validate a MISMO document.
///
/// A structural failure is reported as a single `MALFORMED_XML` error and
/// no content checks run on that document.
pub fn validate_xml(xml: &str) -> XmlValidationReport {
    let content_hash = compute_content_hash(xml);
    let structure = check_well_formed(xml);

    if !structure.valid {
        let message = structure
            .error
            .unwrap_or_else(|| "Document is not well-formed".to_string());
        tracing::debug!(%message, "document failed well-formedness check");
        let mut issue =
            ValidationIssue::error(IssueCode::MalformedXml, IssueCategory::Structure, message);
        if let (Some(line), Some(column)) = (structure.line, structure.column) {
            issue = issue.at(line, column);
        }
        return XmlValidationReport {
            valid: false,
            well_formed: false,
            errors: vec![issue],
            warnings: Vec::new(),
            namespaces: Vec::new(),
            extensions: ExtensionSummary::default(),
            content_hash,
        };
    }

    let enum_findings = validate_enum_values(xml);
    let mut warnings = enum_findings.warnings;
    warnings.extend(validate_datatypes(xml));
    let errors = enum_findings.errors;

    XmlValidationReport {
        valid: errors.is_empty(),
        well_formed: true,
        errors,
        warnings,
        namespaces: detect_namespaces(xml),
        extensions: detect_extensions(xml),
        content_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_document_stops_after_structure() {
        let report = validate_xml("<LOAN><StateCode>ZZ</StateCode>");
        assert!(!report.valid);
        assert!(!report.well_formed);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, IssueCode::MalformedXml);
        assert_eq!(report.errors[0].category, IssueCategory::Structure);
        assert_eq!(report.errors[0].line, Some(1));
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let xml = r#"<MESSAGE xmlns="http://www.mismo.org/residential/2009/schemas"><NoteRatePercent>seven</NoteRatePercent></MESSAGE>"#;
        let report = validate_xml(xml);
        assert!(report.valid);
        assert!(report.well_formed);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.namespaces.len(), 1);
        assert_eq!(report.content_hash, compute_content_hash(xml));
    }

    #[test]
    fn test_enum_errors_invalidate() {
        let report = validate_xml("<A><MortgageType>Jumbo</MortgageType></A>");
        assert!(!report.valid);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].xpath.as_deref(), Some("//MortgageType"));
    }
}
