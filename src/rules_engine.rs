//! Field mapping and enum translation engine.
//!
//! [`dispatch`] is the single entry point behind the HTTP action endpoint:
//! it parses the request's `action` into [`Action`] and runs the matching
//! operation over the static mapping and enum tables. Bad caller input is a
//! [`RulesError`] client error; bad business data is reported as findings
//! inside a successful result.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::datatypes::{
    Datatype, FormatOptions, MAX_PERCENT_DECIMALS, format_value, value_as_text,
};
use crate::enums::{enum_maps, ldd_enum, map_to_mismo};
use crate::error::{Result, RulesError};
use crate::issue::{IssueCategory, IssueCode, ValidationIssue};
use crate::mappings::{FIELD_MAPPINGS, FieldMapping, RequiredIf, bpa_fields, field_mapping};
use crate::xml_validator::validate_xml;

/// Record keys that are never reported as unmapped.
pub const BOOKKEEPING_FIELDS: &[&str] = &["id", "created_date", "updated_date", "created_by"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Validate,
    ValidateEnum,
    FormatValue,
    GetEnumValues,
    GetAllEnums,
    GetFieldMappings,
    MapToMismo,
    TestMappingCoverage,
    ValidateXml,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Validate,
        Action::ValidateEnum,
        Action::FormatValue,
        Action::GetEnumValues,
        Action::GetAllEnums,
        Action::GetFieldMappings,
        Action::MapToMismo,
        Action::TestMappingCoverage,
        Action::ValidateXml,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Validate => "validate",
            Action::ValidateEnum => "validate_enum",
            Action::FormatValue => "format_value",
            Action::GetEnumValues => "get_enum_values",
            Action::GetAllEnums => "get_all_enums",
            Action::GetFieldMappings => "get_field_mappings",
            Action::MapToMismo => "map_to_mismo",
            Action::TestMappingCoverage => "test_mapping_coverage",
            Action::ValidateXml => "validate_xml",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RulesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| RulesError::UnknownAction(s.to_string()))
    }
}

/// Body of a rules action request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
}

impl RulesRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    fn required_value(&self) -> Result<&Value> {
        match &self.value {
            None | Some(Value::Null) => Err(RulesError::MissingParameter("value")),
            Some(value) => Ok(value),
        }
    }

    fn required_text(&self) -> Result<String> {
        value_as_text(self.required_value()?)
            .ok_or_else(|| RulesError::InvalidRequest("value must be a string, number or boolean".into()))
    }

    fn mapped_field(&self) -> Result<Option<&'static FieldMapping>> {
        match self.field.as_deref() {
            None => Ok(None),
            Some(name) => field_mapping(name)
                .map(Some)
                .ok_or_else(|| RulesError::InvalidRequest(format!("Unknown field: {name}"))),
        }
    }

    /// Explicit `enum_type`, else the enum type of the mapped `field`.
    fn resolve_enum_type(&self) -> Result<&str> {
        let enum_type = match self.enum_type.as_deref() {
            Some(enum_type) => enum_type,
            None => self
                .mapped_field()?
                .and_then(|mapping| mapping.enum_type)
                .ok_or(RulesError::MissingParameter("enum_type"))?,
        };
        if ldd_enum(enum_type).is_none() {
            return Err(RulesError::UnknownEnumType(enum_type.to_string()));
        }
        Ok(enum_type)
    }

    /// Explicit `datatype`, else the datatype of the mapped `field`.
    fn resolve_datatype(&self) -> Result<Datatype> {
        match self.datatype.as_deref() {
            Some(datatype) => datatype.parse(),
            None => self
                .mapped_field()?
                .map(|mapping| mapping.datatype)
                .ok_or(RulesError::MissingParameter("datatype")),
        }
    }

    fn data_object(&self) -> Result<Option<&Map<String, Value>>> {
        match &self.data {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(RulesError::InvalidRequest("data must be an object".into())),
        }
    }
}

/// One translated value destined for a MISMO document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismoValue {
    pub field: String,
    pub mismo_path: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub mismo_data: Vec<MismoValue>,
    pub fields_processed: usize,
    pub fields_mapped: usize,
    pub validated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumCheck {
    pub valid: bool,
    pub value: String,
    pub enum_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismo_value: Option<&'static str>,
    pub allowed_values: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedValue {
    pub original: Value,
    pub datatype: Datatype,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResult {
    pub original: String,
    pub mismo_value: Option<&'static str>,
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValues {
    pub enum_type: String,
    pub values: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumListing {
    #[serde(rename = "internalValues")]
    pub internal_values: Vec<&'static str>,
    #[serde(rename = "mismoValues")]
    pub mismo_values: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDetail {
    pub field: &'static str,
    pub group: &'static str,
    pub mapped: bool,
    #[serde(flatten)]
    pub mapping: Option<FieldMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_fields: usize,
    pub mapped_fields: usize,
    pub unmapped_fields: Vec<&'static str>,
    pub field_details: Vec<FieldDetail>,
    pub coverage_percent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<TransformResult>,
}

/// Run one rules action and return its JSON payload.
pub fn dispatch(request: &RulesRequest) -> Result<Value> {
    let action: Action = request.action.parse()?;
    tracing::debug!(%action, "dispatching rules action");

    let payload = match action {
        Action::Validate => {
            let data = request
                .data_object()?
                .ok_or(RulesError::MissingParameter("data"))?;
            serde_json::to_value(validate_and_transform(data))?
        }
        Action::ValidateEnum => {
            let enum_type = request.resolve_enum_type()?;
            let value = request.required_text()?;
            serde_json::to_value(check_enum(&value, enum_type))?
        }
        Action::FormatValue => {
            let datatype = request.resolve_datatype()?;
            let value = request.required_value()?;
            let mut options: FormatOptions = match &request.options {
                None | Some(Value::Null) => FormatOptions::default(),
                Some(options) => serde_json::from_value(options.clone())
                    .map_err(|e| RulesError::InvalidRequest(format!("invalid options: {e}")))?,
            };
            if let Some(decimals) = options.decimals.filter(|d| *d > MAX_PERCENT_DECIMALS) {
                return Err(RulesError::InvalidRequest(format!(
                    "invalid options: decimals must be at most {MAX_PERCENT_DECIMALS}, got {decimals}"
                )));
            }
            if datatype == Datatype::Enum && options.enum_type.is_none() {
                options.enum_type = Some(request.resolve_enum_type()?.to_string());
            }
            serde_json::to_value(format_single(value, datatype, &options))?
        }
        Action::GetEnumValues => {
            let enum_type = request.resolve_enum_type()?;
            serde_json::to_value(EnumValues {
                enum_type: enum_type.to_string(),
                values: ldd_enum(enum_type).unwrap_or_default(),
            })?
        }
        Action::GetAllEnums => {
            serde_json::json!({ "enums": serde_json::to_value(enum_listings())? })
        }
        Action::GetFieldMappings => {
            let mappings: BTreeMap<&str, &FieldMapping> = FIELD_MAPPINGS
                .iter()
                .map(|(name, mapping)| (*name, mapping))
                .collect();
            serde_json::json!({ "mappings": serde_json::to_value(mappings)? })
        }
        Action::MapToMismo => {
            let enum_type = request.resolve_enum_type()?;
            let original = request.required_text()?;
            let mismo_value = map_to_mismo(&original, enum_type);
            if mismo_value.is_none() {
                tracing::warn!(value = %original, enum_type, "no MISMO mapping for value");
            }
            serde_json::to_value(MapResult {
                original,
                mismo_value,
                mapped: mismo_value.is_some(),
            })?
        }
        Action::TestMappingCoverage => {
            serde_json::to_value(run_bpa_mapping_test(request.data_object()?))?
        }
        Action::ValidateXml => {
            let xml = request
                .xml
                .as_deref()
                .ok_or(RulesError::MissingParameter("xml"))?;
            serde_json::to_value(validate_xml(xml))?
        }
    };

    Ok(payload)
}

/// Every enum key with its internal and MISMO vocabularies.
pub fn enum_listings() -> BTreeMap<&'static str, EnumListing> {
    enum_maps()
        .iter()
        .map(|(key, map)| {
            (
                *key,
                EnumListing {
                    internal_values: map.internal_values(),
                    mismo_values: map.mismo_values,
                },
            )
        })
        .collect()
}

/// Check a single value against an enum key, accepting internal literals
/// that translate into the LDD vocabulary.
pub fn check_enum(value: &str, enum_type: &str) -> EnumCheck {
    let mismo_value = map_to_mismo(value, enum_type);
    EnumCheck {
        valid: mismo_value.is_some(),
        value: value.to_string(),
        enum_type: enum_type.to_string(),
        mismo_value,
        allowed_values: ldd_enum(enum_type).unwrap_or_default(),
    }
}

fn format_single(value: &Value, datatype: Datatype, options: &FormatOptions) -> FormattedValue {
    let (formatted, error) = match format_value(value, datatype, options) {
        Ok(formatted) => (Some(formatted), None),
        Err(e) => (None, Some(e.to_string())),
    };
    FormattedValue {
        original: value.clone(),
        datatype,
        valid: formatted.is_some(),
        formatted,
        error,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn condition_met(condition: &RequiredIf, data: &Map<String, Value>) -> bool {
    let trigger = data.get(condition.field);
    if !is_present(trigger) {
        return false;
    }
    match condition.equals {
        None => true,
        Some(expected) => trigger
            .and_then(value_as_text)
            .is_some_and(|actual| {
                expected
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(actual.trim()))
            }),
    }
}

fn element_xpath(mismo_path: &str) -> String {
    let element = mismo_path.rsplit('/').next().unwrap_or(mismo_path);
    format!("//{element}")
}

/// Map an internal business object to MISMO values, collecting findings.
pub fn validate_and_transform(data: &Map<String, Value>) -> TransformResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut mismo_data = Vec::new();

    for (name, mapping) in FIELD_MAPPINGS {
        let value = data.get(*name);

        if !is_present(value) {
            if mapping.required {
                errors.push(
                    ValidationIssue::error(
                        IssueCode::RequiredFieldMissing,
                        IssueCategory::Required,
                        format!("Required field '{name}' is missing"),
                    )
                    .with_field(*name)
                    .with_xpath(element_xpath(mapping.mismo_path)),
                );
            } else if let Some(condition) = mapping.required_if.filter(|c| condition_met(c, data)) {
                errors.push(
                    ValidationIssue::error(
                        IssueCode::ConditionalFieldMissing,
                        IssueCategory::Required,
                        format!("Field '{name}' is required when '{}' is set", condition.field),
                    )
                    .with_field(*name)
                    .with_xpath(element_xpath(mapping.mismo_path)),
                );
            }
            continue;
        }
        let Some(value) = value else { continue };

        match mapping.enum_type {
            Some(enum_type) => {
                let text = value_as_text(value).unwrap_or_else(|| value.to_string());
                match map_to_mismo(&text, enum_type) {
                    Some(mismo) => mismo_data.push(MismoValue {
                        field: name.to_string(),
                        mismo_path: mapping.mismo_path.to_string(),
                        value: mismo.to_string(),
                    }),
                    None => {
                        tracing::warn!(field = *name, value = %text, enum_type, "unmapped enum value");
                        errors.push(
                            ValidationIssue::error(
                                IssueCode::UnmappedEnumValue,
                                IssueCategory::Mapping,
                                format!("Value '{text}' for '{name}' has no {enum_type} mapping"),
                            )
                            .with_field(*name)
                            .with_xpath(element_xpath(mapping.mismo_path))
                            .with_allowed_values(ldd_enum(enum_type).unwrap_or_default().iter().copied()),
                        );
                    }
                }
            }
            None => match format_value(value, mapping.datatype, &FormatOptions::default()) {
                Ok(formatted) => mismo_data.push(MismoValue {
                    field: name.to_string(),
                    mismo_path: mapping.mismo_path.to_string(),
                    value: formatted,
                }),
                Err(e) => warnings.push(
                    ValidationIssue::warning(
                        IssueCode::DatatypeViolation,
                        IssueCategory::Datatype,
                        format!("Field '{name}' is not a valid {}: {e}", mapping.datatype),
                    )
                    .with_field(*name)
                    .with_xpath(element_xpath(mapping.mismo_path)),
                ),
            },
        }
    }

    let mut fields_processed = 0;
    for key in data.keys() {
        if BOOKKEEPING_FIELDS.contains(&key.as_str()) {
            continue;
        }
        fields_processed += 1;
        if field_mapping(key).is_none() {
            warnings.push(
                ValidationIssue::warning(
                    IssueCode::UnmappedField,
                    IssueCategory::Mapping,
                    format!("Field '{key}' has no MISMO mapping"),
                )
                .with_field(key.as_str()),
            );
        }
    }

    tracing::debug!(
        fields_processed,
        fields_mapped = mismo_data.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "validated business object"
    );

    TransformResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        fields_mapped: mismo_data.len(),
        mismo_data,
        fields_processed,
        validated_at: Utc::now(),
    }
}

/// Report mapping coverage for the fixed BPA field list.
///
/// With a non-empty `data` object the report also carries a full
/// [`validate_and_transform`] pass over it.
pub fn run_bpa_mapping_test(data: Option<&Map<String, Value>>) -> CoverageReport {
    let mut unmapped_fields = Vec::new();
    let mut field_details = Vec::new();

    for (group, field) in bpa_fields() {
        let mapping = field_mapping(field).copied();
        if mapping.is_none() {
            unmapped_fields.push(field);
        }
        field_details.push(FieldDetail {
            field,
            group,
            mapped: mapping.is_some(),
            mapping,
        });
    }

    let total_fields = field_details.len();
    let mapped_fields = total_fields - unmapped_fields.len();
    let coverage = if total_fields == 0 {
        0.0
    } else {
        mapped_fields as f64 / total_fields as f64 * 100.0
    };

    CoverageReport {
        total_fields,
        mapped_fields,
        unmapped_fields,
        field_details,
        coverage_percent: format!("{:.1}", coverage),
        validation_result: data
            .filter(|data| !data.is_empty())
            .map(validate_and_transform),
    }
}
