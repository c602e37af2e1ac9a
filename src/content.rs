//! Element value checks against the LDD enumerations and datatype patterns.
//!
//! Values are located by scanning for `<Element>value</Element>` text. The
//! scan does not track XPath depth, so elements sharing a local name at
//! different depths are checked alike.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::datatypes::{Datatype, matches_datatype};
use crate::enums::{is_ldd_member, ldd_enum};
use crate::issue::{IssueCategory, IssueCode, ValidationIssue};
use crate::well_formed::line_and_column;

/// Elements whose text must come from an LDD enumeration, paired with the
/// enum key that governs them.
pub const ENUM_ELEMENTS: &[(&str, &str)] = &[
    ("LoanPurposeType", "LoanPurposeType"),
    ("PropertyUsageType", "PropertyUsageType"),
    ("PropertyEstateType", "PropertyEstateType"),
    ("ConstructionMethodType", "ConstructionMethodType"),
    ("AttachmentType", "AttachmentType"),
    ("LegalEntityType", "LegalEntityType"),
    ("CitizenshipResidencyType", "CitizenshipResidencyType"),
    ("MaritalStatusType", "MaritalStatusType"),
    ("AssetType", "AssetType"),
    ("MortgageType", "MortgageType"),
    ("AmortizationType", "AmortizationType"),
    ("PartyRoleType", "PartyRoleType"),
    ("StateCode", "StateCode"),
];

/// Elements checked for lexical datatype conformance.
pub const DATATYPE_ELEMENTS: &[(&str, Datatype)] = &[
    ("BaseLoanAmount", Datatype::Amount),
    ("PropertyEstimatedValueAmount", Datatype::Amount),
    ("PurchasePriceAmount", Datatype::Amount),
    ("AssetCashOrMarketValueAmount", Datatype::Amount),
    ("NoteRatePercent", Datatype::Percent),
    ("LTVRatioPercent", Datatype::Percent),
    ("ApplicationReceivedDate", Datatype::Date),
    ("BorrowerBirthDate", Datatype::Date),
    ("PostalCode", Datatype::PostalCode),
];

const ALLOWED_PREVIEW: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFindings {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

static ELEMENT_REGEXES: OnceLock<HashMap<&'static str, Regex>> = OnceLock::new();

fn element_regex(element: &str) -> Option<&'static Regex> {
    ELEMENT_REGEXES
        .get_or_init(|| {
            ENUM_ELEMENTS
                .iter()
                .map(|(element, _)| *element)
                .chain(DATATYPE_ELEMENTS.iter().map(|(element, _)| *element))
                .map(|element| {
                    let pattern = format!(r"<{0}>([^<]*)</{0}>", regex::escape(element));
                    let regex = Regex::new(&pattern).expect("Failed to compile element regex");
                    (element, regex)
                })
                .collect()
        })
        .get(element)
}

/// Every `(offset, trimmed value)` for `element`, skipping empty values.
fn element_values<'a>(xml: &'a str, element: &str) -> Vec<(usize, &'a str)> {
    let Some(regex) = element_regex(element) else {
        return Vec::new();
    };
    regex
        .captures_iter(xml)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let value = captures.get(1)?.as_str().trim();
            (!value.is_empty()).then_some((whole.start(), value))
        })
        .collect()
}

/// Check every enum-governed element against its LDD vocabulary.
pub fn validate_enum_values(xml: &str) -> ContentFindings {
    let mut findings = ContentFindings::default();

    for (element, enum_key) in ENUM_ELEMENTS {
        let Some(allowed) = ldd_enum(enum_key) else {
            continue;
        };
        for (offset, value) in element_values(xml, element) {
            if is_ldd_member(enum_key, value) {
                continue;
            }
            let (line, column) = line_and_column(xml, offset);
            let mut preview = allowed
                .iter()
                .take(ALLOWED_PREVIEW)
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            if allowed.len() > ALLOWED_PREVIEW {
                preview.push_str(&format!(" (and {} more)", allowed.len() - ALLOWED_PREVIEW));
            }
            tracing::debug!(element, value, line, "invalid LDD enum value");
            findings.errors.push(
                ValidationIssue::error(
                    IssueCode::InvalidLddEnum,
                    IssueCategory::Enum,
                    format!("Invalid {element} value '{value}'. Allowed: {preview}"),
                )
                .at(line, column)
                .with_xpath(format!("//{element}"))
                .with_allowed_values(allowed.iter().copied()),
            );
        }
    }

    findings
}

/// Check datatype-governed elements against their lexical patterns.
///
/// Mismatches are warnings only.
pub fn validate_datatypes(xml: &str) -> Vec<ValidationIssue> {
    let mut warnings = Vec::new();

    for (element, datatype) in DATATYPE_ELEMENTS {
        for (offset, value) in element_values(xml, element) {
            if matches_datatype(*datatype, value) {
                continue;
            }
            let (line, column) = line_and_column(xml, offset);
            warnings.push(
                ValidationIssue::warning(
                    IssueCode::DatatypeViolation,
                    IssueCategory::Datatype,
                    format!("{element} value '{value}' is not a valid {datatype}"),
                )
                .at(line, column)
                .with_xpath(format!("//{element}")),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    #[test]
    fn test_valid_enum_produces_no_errors() {
        let xml = "<LOAN><LoanPurposeType>Purchase</LoanPurposeType><StateCode>CA</StateCode></LOAN>";
        assert!(validate_enum_values(xml).errors.is_empty());
    }

    #[test]
    fn test_every_occurrence_is_checked() {
        let xml = "<A><StateCode>TX</StateCode>\n<StateCode>ZZ</StateCode>\n<StateCode>QQ</StateCode></A>";
        let findings = validate_enum_values(xml);
        assert_eq!(findings.errors.len(), 2);
        assert_eq!(findings.errors[0].line, Some(2));
        assert_eq!(findings.errors[1].line, Some(3));
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn test_error_message_previews_allowed_values() {
        let xml = "<MaritalStatusType>Complicated</MaritalStatusType>";
        let error = &validate_enum_values(xml).errors[0];
        assert_eq!(error.code, IssueCode::InvalidLddEnum);
        assert_eq!(error.severity, Severity::Error);
        assert!(error.message.contains("Complicated"));
        assert!(error.message.contains("Married, Separated, Unmarried, Unknown"));
        assert!(!error.message.contains("more"));

        let xml = "<StateCode>ZZ</StateCode>";
        let error = &validate_enum_values(xml).errors[0];
        assert!(error.message.contains("AL, AK, AZ, AR, CA (and 51 more)"));
        assert_eq!(error.allowed_values.as_ref().unwrap().len(), 56);
    }

    #[test]
    fn test_empty_and_whitespace_values_are_skipped() {
        let xml = "<LoanPurposeType></LoanPurposeType><StateCode>  </StateCode>";
        assert!(validate_enum_values(xml).errors.is_empty());
        assert!(validate_datatypes("<PostalCode> </PostalCode>").is_empty());
    }

    #[test]
    fn test_datatype_mismatches_are_warnings() {
        let xml = "<L>\n<BaseLoanAmount>350000.00</BaseLoanAmount>\n<NoteRatePercent>abc</NoteRatePercent>\n<ApplicationReceivedDate>03/15/2024</ApplicationReceivedDate>\n<PostalCode>94105</PostalCode></L>";
        let warnings = validate_datatypes(xml);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.severity == Severity::Warning));
        assert!(warnings.iter().all(|w| w.code == IssueCode::DatatypeViolation));
        assert_eq!(warnings[0].xpath.as_deref(), Some("//NoteRatePercent"));
        assert_eq!(warnings[0].line, Some(3));
        assert_eq!(warnings[1].xpath.as_deref(), Some("//ApplicationReceivedDate"));
    }

    #[test]
    fn test_element_tables_are_consistent() {
        assert_eq!(ENUM_ELEMENTS.len(), 13);
        for (element, key) in ENUM_ELEMENTS {
            assert!(ldd_enum(key).is_some(), "{element} uses unknown key {key}");
        }
        for (_, datatype) in DATATYPE_ELEMENTS {
            assert!(datatype.pattern().is_some());
        }
    }
}
