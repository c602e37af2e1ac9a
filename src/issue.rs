//! Validation findings shared by the XML validators and the rules engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable finding code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Document is not well-formed XML
    MalformedXml,
    /// Element value outside its LDD enumeration
    InvalidLddEnum,
    /// Value does not match its datatype's lexical form
    DatatypeViolation,
    RequiredFieldMissing,
    ConditionalFieldMissing,
    /// Internal enum literal with no MISMO translation
    UnmappedEnumValue,
    /// Internal field with no MISMO mapping
    UnmappedField,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::MalformedXml => "MALFORMED_XML",
            IssueCode::InvalidLddEnum => "INVALID_LDD_ENUM",
            IssueCode::DatatypeViolation => "DATATYPE_VIOLATION",
            IssueCode::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            IssueCode::ConditionalFieldMissing => "CONDITIONAL_FIELD_MISSING",
            IssueCode::UnmappedEnumValue => "UNMAPPED_ENUM_VALUE",
            IssueCode::UnmappedField => "UNMAPPED_FIELD",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Structure,
    Enum,
    Datatype,
    Required,
    Mapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    /// Internal field name, for findings raised against business objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(code, category, Severity::Error, message)
    }

    pub fn warning(code: IssueCode, category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(code, category, Severity::Warning, message)
    }

    fn new(
        code: IssueCode,
        category: IssueCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            message: message.into(),
            line: None,
            column: None,
            xpath: None,
            field: None,
            allowed_values: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "[{}] {}:{} {}", self.code, line, column, self.message)
            }
            (Some(line), None) => write!(f, "[{}] line {} {}", self.code, line, self.message),
            _ => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_serializes_wire_shape() {
        let issue = ValidationIssue::error(
            IssueCode::InvalidLddEnum,
            IssueCategory::Enum,
            "bad value",
        )
        .at(3, 7)
        .with_xpath("//StateCode")
        .with_allowed_values(["AL", "AK"]);

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "INVALID_LDD_ENUM",
                "category": "enum",
                "severity": "error",
                "message": "bad value",
                "line": 3,
                "column": 7,
                "xpath": "//StateCode",
                "allowed_values": ["AL", "AK"]
            })
        );
    }

    #[test]
    fn test_warning_omits_empty_locators() {
        let issue = ValidationIssue::warning(
            IssueCode::DatatypeViolation,
            IssueCategory::Datatype,
            "not a percent",
        );
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["severity"], "warning");
        assert!(value.get("line").is_none());
        assert!(value.get("allowed_values").is_none());
        assert!(!issue.is_error());
    }

    #[test]
    fn test_display_includes_position() {
        let issue = ValidationIssue::error(IssueCode::MalformedXml, IssueCategory::Structure, "x")
            .at(2, 5);
        assert_eq!(issue.to_string(), "[MALFORMED_XML] 2:5 x");
    }
}
