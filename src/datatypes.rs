//! MISMO datatypes: lexical patterns and value formatting.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::enums::map_to_mismo;
use crate::error::RulesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Datatype {
    #[serde(rename = "MISMOAmount")]
    Amount,
    #[serde(rename = "MISMOPercent")]
    Percent,
    #[serde(rename = "MISMODate")]
    Date,
    #[serde(rename = "MISMOPostalCode")]
    PostalCode,
    #[serde(rename = "MISMOString")]
    String,
    #[serde(rename = "MISMOIdentifier")]
    Identifier,
    #[serde(rename = "MISMOIndicator")]
    Indicator,
    #[serde(rename = "MISMOCount")]
    Count,
    #[serde(rename = "MISMONumeric")]
    Numeric,
    #[serde(rename = "MISMOEnum")]
    Enum,
}

impl Datatype {
    pub const ALL: [Datatype; 10] = [
        Datatype::Amount,
        Datatype::Percent,
        Datatype::Date,
        Datatype::PostalCode,
        Datatype::String,
        Datatype::Identifier,
        Datatype::Indicator,
        Datatype::Count,
        Datatype::Numeric,
        Datatype::Enum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Datatype::Amount => "MISMOAmount",
            Datatype::Percent => "MISMOPercent",
            Datatype::Date => "MISMODate",
            Datatype::PostalCode => "MISMOPostalCode",
            Datatype::String => "MISMOString",
            Datatype::Identifier => "MISMOIdentifier",
            Datatype::Indicator => "MISMOIndicator",
            Datatype::Count => "MISMOCount",
            Datatype::Numeric => "MISMONumeric",
            Datatype::Enum => "MISMOEnum",
        }
    }

    /// Compiled lexical pattern, for the datatypes that have one.
    pub fn pattern(self) -> Option<&'static Regex> {
        compiled_patterns()
            .iter()
            .find(|(datatype, _)| *datatype == self)
            .map(|(_, regex)| regex)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Datatype::ALL
            .into_iter()
            .find(|datatype| datatype.as_str() == s)
            .ok_or_else(|| RulesError::UnknownDatatype(s.to_string()))
    }
}

/// Lexical forms checked by the datatype validator.
pub const DATATYPE_PATTERNS: &[(Datatype, &str)] = &[
    (Datatype::Amount, r"^-?\d+(\.\d{1,2})?$"),
    (Datatype::Percent, r"^-?\d{1,3}(\.\d{1,6})?$"),
    (
        Datatype::Date,
        r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$",
    ),
    (Datatype::PostalCode, r"^\d{5}(-\d{4})?$"),
];

static COMPILED_PATTERNS: OnceLock<Vec<(Datatype, Regex)>> = OnceLock::new();

fn compiled_patterns() -> &'static [(Datatype, Regex)] {
    COMPILED_PATTERNS.get_or_init(|| {
        DATATYPE_PATTERNS
            .iter()
            .map(|(datatype, source)| {
                let regex = Regex::new(source).expect("Failed to compile datatype pattern");
                (*datatype, regex)
            })
            .collect()
    })
}

/// Whether `value` matches the lexical form of `datatype`.
///
/// Datatypes without a pattern accept any value.
pub fn matches_datatype(datatype: Datatype, value: &str) -> bool {
    datatype
        .pattern()
        .is_none_or(|pattern| pattern.is_match(value))
}

/// Caller-supplied formatting knobs (`options` in the action request).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Decimal places for percents (default 4)
    pub decimals: Option<usize>,
    /// Maximum character length for strings
    pub max_length: Option<usize>,
    /// Keep only digits in identifiers
    pub digits_only: bool,
    /// Enum key used by `MISMOEnum`
    pub enum_type: Option<String>,
}

const DEFAULT_PERCENT_DECIMALS: usize = 4;

/// Largest accepted `decimals` option.
pub const MAX_PERCENT_DECIMALS: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("value is empty")]
    Empty,

    #[error("unsupported value: {0}")]
    Unsupported(String),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a recognized date")]
    InvalidDate(String),

    #[error("'{0}' is not a 5 or 9 digit postal code")]
    InvalidPostalCode(String),

    #[error("'{0}' is not a yes/no indicator")]
    InvalidIndicator(String),

    #[error("'{0}' is not a non-negative whole number")]
    InvalidCount(String),

    #[error("decimals must be at most {MAX_PERCENT_DECIMALS}, got {0}")]
    DecimalsOutOfRange(usize),

    #[error("MISMOEnum formatting requires an enum_type option")]
    MissingEnumType,

    #[error("'{value}' has no MISMO mapping for {enum_type}")]
    UnmappedEnum { value: String, enum_type: String },
}

/// Render a JSON scalar as text; `None` for null and for non-scalars.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Format a raw value into the canonical lexical form of `datatype`.
pub fn format_value(
    value: &Value,
    datatype: Datatype,
    options: &FormatOptions,
) -> Result<String, FormatError> {
    let text = match value {
        Value::Null => return Err(FormatError::Empty),
        Value::Array(_) | Value::Object(_) => {
            return Err(FormatError::Unsupported(value.to_string()));
        }
        other => value_as_text(other).unwrap_or_default(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FormatError::Empty);
    }

    match datatype {
        Datatype::Amount => {
            let amount = parse_decimal(trimmed, &['$', ','])?;
            Ok(format!("{:.2}", amount))
        }
        Datatype::Percent => {
            let percent = parse_decimal(trimmed, &['%', ','])?;
            let decimals = options.decimals.unwrap_or(DEFAULT_PERCENT_DECIMALS);
            if decimals > MAX_PERCENT_DECIMALS {
                return Err(FormatError::DecimalsOutOfRange(decimals));
            }
            Ok(format!("{:.*}", decimals, percent))
        }
        Datatype::Numeric => {
            let number = parse_decimal(trimmed, &[','])?;
            Ok(number.to_string())
        }
        Datatype::Count => format_count(trimmed),
        Datatype::Date => format_date(trimmed),
        Datatype::PostalCode => format_postal_code(trimmed),
        Datatype::Indicator => format_indicator(trimmed),
        Datatype::Identifier => {
            if options.digits_only {
                let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    return Err(FormatError::Empty);
                }
                Ok(digits)
            } else {
                Ok(trimmed.to_string())
            }
        }
        Datatype::String => Ok(match options.max_length {
            Some(max) => trimmed.chars().take(max).collect(),
            None => trimmed.to_string(),
        }),
        Datatype::Enum => {
            let enum_type = options
                .enum_type
                .as_deref()
                .ok_or(FormatError::MissingEnumType)?;
            map_to_mismo(trimmed, enum_type)
                .map(str::to_string)
                .ok_or_else(|| FormatError::UnmappedEnum {
                    value: trimmed.to_string(),
                    enum_type: enum_type.to_string(),
                })
        }
    }
}

fn parse_decimal(text: &str, strip: &[char]) -> Result<f64, FormatError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !strip.contains(c) && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormatError::NotANumber(text.to_string()))
}

fn format_count(text: &str) -> Result<String, FormatError> {
    let invalid = || FormatError::InvalidCount(text.to_string());
    if let Ok(count) = text.parse::<u64>() {
        return Ok(count.to_string());
    }
    let number = text.parse::<f64>().map_err(|_| invalid())?;
    if number < 0.0 || number.fract() != 0.0 || !number.is_finite() {
        return Err(invalid());
    }
    Ok(format!("{:.0}", number))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];

fn format_date(text: &str) -> Result<String, FormatError> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .ok_or_else(|| FormatError::InvalidDate(text.to_string()))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn format_postal_code(text: &str) -> Result<String, FormatError> {
    let digits: String = text
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormatError::InvalidPostalCode(text.to_string()));
    }
    match digits.len() {
        5 => Ok(digits),
        9 => Ok(format!("{}-{}", &digits[..5], &digits[5..])),
        _ => Err(FormatError::InvalidPostalCode(text.to_string())),
    }
}

fn format_indicator(text: &str) -> Result<String, FormatError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok("true".to_string()),
        "false" | "no" | "n" | "0" => Ok("false".to_string()),
        _ => Err(FormatError::InvalidIndicator(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fmt(value: Value, datatype: Datatype) -> Result<String, FormatError> {
        format_value(&value, datatype, &FormatOptions::default())
    }

    #[test]
    fn test_datatype_names_round_trip_through_from_str() {
        for datatype in Datatype::ALL {
            assert_eq!(datatype.as_str().parse::<Datatype>().unwrap(), datatype);
        }
        assert!(matches!(
            "MISMOBlob".parse::<Datatype>(),
            Err(RulesError::UnknownDatatype(_))
        ));
    }

    #[test]
    fn test_patterns() {
        assert!(matches_datatype(Datatype::Amount, "250000.00"));
        assert!(matches_datatype(Datatype::Amount, "-12"));
        assert!(!matches_datatype(Datatype::Amount, "$250,000"));
        assert!(matches_datatype(Datatype::Percent, "7.125"));
        assert!(!matches_datatype(Datatype::Percent, "abc"));
        assert!(matches_datatype(Datatype::Date, "2024-02-29"));
        assert!(!matches_datatype(Datatype::Date, "02/29/2024"));
        assert!(!matches_datatype(Datatype::Date, "2024-13-01"));
        assert!(matches_datatype(Datatype::PostalCode, "94105-1234"));
        assert!(!matches_datatype(Datatype::PostalCode, "9410"));
        // no pattern for strings
        assert!(matches_datatype(Datatype::String, "anything <at> all"));
    }

    #[test]
    fn test_format_amount_and_percent() {
        assert_eq!(fmt(json!("$1,250,000"), Datatype::Amount).unwrap(), "1250000.00");
        assert_eq!(fmt(json!(350000.5), Datatype::Amount).unwrap(), "350000.50");
        assert_eq!(fmt(json!("7.25%"), Datatype::Percent).unwrap(), "7.2500");

        let options = FormatOptions {
            decimals: Some(3),
            ..Default::default()
        };
        assert_eq!(
            format_value(&json!(6.5), Datatype::Percent, &options).unwrap(),
            "6.500"
        );
        assert!(matches!(
            fmt(json!("lots"), Datatype::Amount),
            Err(FormatError::NotANumber(_))
        ));
    }

    #[test]
    fn test_percent_decimals_are_bounded() {
        let at_limit = FormatOptions {
            decimals: Some(MAX_PERCENT_DECIMALS),
            ..Default::default()
        };
        let formatted = format_value(&json!("7.25"), Datatype::Percent, &at_limit).unwrap();
        assert_eq!(formatted.split('.').nth(1).map(str::len), Some(MAX_PERCENT_DECIMALS));

        let too_many = FormatOptions {
            decimals: Some(70_000),
            ..Default::default()
        };
        assert_eq!(
            format_value(&json!("7.25"), Datatype::Percent, &too_many),
            Err(FormatError::DecimalsOutOfRange(70_000))
        );
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(fmt(json!("2024-03-15"), Datatype::Date).unwrap(), "2024-03-15");
        assert_eq!(fmt(json!("03/15/2024"), Datatype::Date).unwrap(), "2024-03-15");
        assert_eq!(fmt(json!("2024/03/15"), Datatype::Date).unwrap(), "2024-03-15");
        assert_eq!(
            fmt(json!("2024-03-15T10:30:00Z"), Datatype::Date).unwrap(),
            "2024-03-15"
        );
        assert!(matches!(
            fmt(json!("yesterday"), Datatype::Date),
            Err(FormatError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_format_postal_code() {
        assert_eq!(fmt(json!("94105"), Datatype::PostalCode).unwrap(), "94105");
        assert_eq!(fmt(json!("941051234"), Datatype::PostalCode).unwrap(), "94105-1234");
        assert_eq!(fmt(json!(94105), Datatype::PostalCode).unwrap(), "94105");
        assert!(fmt(json!("9410"), Datatype::PostalCode).is_err());
        assert!(fmt(json!("ABCDE"), Datatype::PostalCode).is_err());
    }

    #[test]
    fn test_format_indicator_and_count() {
        assert_eq!(fmt(json!(true), Datatype::Indicator).unwrap(), "true");
        assert_eq!(fmt(json!("No"), Datatype::Indicator).unwrap(), "false");
        assert!(fmt(json!("maybe"), Datatype::Indicator).is_err());

        assert_eq!(fmt(json!(360), Datatype::Count).unwrap(), "360");
        assert_eq!(fmt(json!("4.0"), Datatype::Count).unwrap(), "4");
        assert!(fmt(json!(-1), Datatype::Count).is_err());
        assert!(fmt(json!(2.5), Datatype::Count).is_err());
    }

    #[test]
    fn test_format_identifier_and_string() {
        let digits = FormatOptions {
            digits_only: true,
            ..Default::default()
        };
        assert_eq!(
            format_value(&json!("12-3456789"), Datatype::Identifier, &digits).unwrap(),
            "123456789"
        );
        assert_eq!(fmt(json!(" enc:AbC== "), Datatype::Identifier).unwrap(), "enc:AbC==");

        let short = FormatOptions {
            max_length: Some(5),
            ..Default::default()
        };
        assert_eq!(
            format_value(&json!("  Main Street  "), Datatype::String, &short).unwrap(),
            "Main "
        );
        assert_eq!(fmt(json!("   "), Datatype::String), Err(FormatError::Empty));
        assert_eq!(fmt(Value::Null, Datatype::String), Err(FormatError::Empty));
        assert!(matches!(
            fmt(json!({"a": 1}), Datatype::String),
            Err(FormatError::Unsupported(_))
        ));
    }

    #[test]
    fn test_format_enum_uses_translation() {
        let options = FormatOptions {
            enum_type: Some("LoanPurposeType".to_string()),
            ..Default::default()
        };
        assert_eq!(
            format_value(&json!("cash_out"), Datatype::Enum, &options).unwrap(),
            "Refinance"
        );
        assert!(matches!(
            format_value(&json!("vacation"), Datatype::Enum, &options),
            Err(FormatError::UnmappedEnum { .. })
        ));
        assert_eq!(
            fmt(json!("purchase"), Datatype::Enum),
            Err(FormatError::MissingEnumType)
        );
    }
}
