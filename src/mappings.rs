//! Internal business field to MISMO XPath mapping table.

use serde::Serialize;

use crate::datatypes::Datatype;

/// Conditional requirement: the mapped field is required when `field` is
/// present, and (with `equals`) holds one of the listed literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequiredIf {
    pub field: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<&'static [&'static str]>,
}

impl RequiredIf {
    pub const fn present(field: &'static str) -> Self {
        Self { field, equals: None }
    }

    pub const fn equals(field: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            field,
            equals: Some(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    #[serde(rename = "mismoPath")]
    pub mismo_path: &'static str,
    pub datatype: Datatype,
    #[serde(rename = "enumType", skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<&'static str>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_if: Option<RequiredIf>,
}

const fn field(mismo_path: &'static str, datatype: Datatype, required: bool) -> FieldMapping {
    FieldMapping {
        mismo_path,
        datatype,
        enum_type: None,
        required,
        required_if: None,
    }
}

const fn enum_field(mismo_path: &'static str, enum_type: &'static str, required: bool) -> FieldMapping {
    FieldMapping {
        mismo_path,
        datatype: Datatype::Enum,
        enum_type: Some(enum_type),
        required,
        required_if: None,
    }
}

/// Every internal field the engine knows how to place in a MISMO document.
pub static FIELD_MAPPINGS: &[(&str, FieldMapping)] = &[
    // Loan
    (
        "loan_amount",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/TERMS_OF_LOAN/BaseLoanAmount",
            Datatype::Amount,
            true,
        ),
    ),
    (
        "loan_purpose",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/TERMS_OF_LOAN/LoanPurposeType",
            "LoanPurposeType",
            true,
        ),
    ),
    (
        "loan_term_months",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/MATURITY/MATURITY_RULE/LoanMaturityPeriodCount",
            Datatype::Count,
            false,
        ),
    ),
    (
        "interest_rate",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/TERMS_OF_LOAN/NoteRatePercent",
            Datatype::Percent,
            false,
        ),
    ),
    (
        "amortization_type",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/AMORTIZATION/AMORTIZATION_RULE/AmortizationType",
            "AmortizationType",
            false,
        ),
    ),
    (
        "mortgage_type",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/TERMS_OF_LOAN/MortgageType",
            "MortgageType",
            false,
        ),
    ),
    (
        "application_date",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/LOAN_DETAIL/ApplicationReceivedDate",
            Datatype::Date,
            false,
        ),
    ),
    (
        "ltv_ratio",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN/LTV/LTVRatioPercent",
            Datatype::Percent,
            false,
        ),
    ),
    // Subject property
    (
        "property_street",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/ADDRESS/AddressLineText",
            Datatype::String,
            true,
        ),
    ),
    (
        "property_city",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/ADDRESS/CityName",
            Datatype::String,
            true,
        ),
    ),
    (
        "property_state",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/ADDRESS/StateCode",
            "StateCode",
            true,
        ),
    ),
    (
        "property_zip",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/ADDRESS/PostalCode",
            Datatype::PostalCode,
            true,
        ),
    ),
    (
        "property_usage",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_DETAIL/PropertyUsageType",
            "PropertyUsageType",
            false,
        ),
    ),
    (
        "property_estate_type",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_DETAIL/PropertyEstateType",
            "PropertyEstateType",
            false,
        ),
    ),
    (
        "construction_method",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_DETAIL/ConstructionMethodType",
            "ConstructionMethodType",
            false,
        ),
    ),
    (
        "attachment_type",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_DETAIL/AttachmentType",
            "AttachmentType",
            false,
        ),
    ),
    (
        "number_of_units",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_DETAIL/FinancedUnitCount",
            Datatype::Count,
            false,
        ),
    ),
    (
        "estimated_value",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/PROPERTY_VALUATIONS/PROPERTY_VALUATION/PROPERTY_VALUATION_DETAIL/PropertyEstimatedValueAmount",
            Datatype::Amount,
            false,
        ),
    ),
    (
        "purchase_price",
        FieldMapping {
            mismo_path: "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY/SALES_CONTRACTS/SALES_CONTRACT/SALES_CONTRACT_DETAIL/PurchasePriceAmount",
            datatype: Datatype::Amount,
            enum_type: None,
            required: false,
            required_if: Some(RequiredIf::equals("loan_purpose", &["purchase"])),
        },
    ),
    // Borrower
    (
        "borrower_first_name",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/INDIVIDUAL/NAME/FirstName",
            Datatype::String,
            true,
        ),
    ),
    (
        "borrower_last_name",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/INDIVIDUAL/NAME/LastName",
            Datatype::String,
            true,
        ),
    ),
    (
        "borrower_email",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/INDIVIDUAL/CONTACT_POINTS/CONTACT_POINT/CONTACT_POINT_EMAIL/ContactPointEmailValue",
            Datatype::String,
            false,
        ),
    ),
    (
        "borrower_phone",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/INDIVIDUAL/CONTACT_POINTS/CONTACT_POINT/CONTACT_POINT_TELEPHONE/ContactPointTelephoneValue",
            Datatype::String,
            false,
        ),
    ),
    (
        "ssn_encrypted",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/TAXPAYER_IDENTIFIERS/TAXPAYER_IDENTIFIER/TaxpayerIdentifierValue",
            Datatype::Identifier,
            false,
        ),
    ),
    (
        "date_of_birth",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/ROLES/ROLE/BORROWER/BORROWER_DETAIL/BorrowerBirthDate",
            Datatype::Date,
            false,
        ),
    ),
    (
        "citizenship_status",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/ROLES/ROLE/BORROWER/DECLARATION/DECLARATION_DETAIL/CitizenshipResidencyType",
            "CitizenshipResidencyType",
            false,
        ),
    ),
    (
        "marital_status",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/ROLES/ROLE/BORROWER/BORROWER_DETAIL/MaritalStatusType",
            "MaritalStatusType",
            false,
        ),
    ),
    (
        "is_self_employed",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/ROLES/ROLE/BORROWER/EMPLOYERS/EMPLOYER/EMPLOYMENT/EmploymentBorrowerSelfEmployedIndicator",
            Datatype::Indicator,
            false,
        ),
    ),
    (
        "party_role",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/ROLES/ROLE/ROLE_DETAIL/PartyRoleType",
            "PartyRoleType",
            false,
        ),
    ),
    // Borrowing entity
    (
        "entity_name",
        field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/LEGAL_ENTITY/LEGAL_ENTITY_DETAIL/FullName",
            Datatype::String,
            false,
        ),
    ),
    (
        "entity_type",
        FieldMapping {
            mismo_path: "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/LEGAL_ENTITY/LEGAL_ENTITY_DETAIL/LegalEntityType",
            datatype: Datatype::Enum,
            enum_type: Some("LegalEntityType"),
            required: false,
            required_if: Some(RequiredIf::present("entity_name")),
        },
    ),
    (
        "ein",
        FieldMapping {
            mismo_path: "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY/TAXPAYER_IDENTIFIERS/TAXPAYER_IDENTIFIER/TaxpayerIdentifierValue",
            datatype: Datatype::Identifier,
            enum_type: None,
            required: false,
            required_if: Some(RequiredIf::present("entity_name")),
        },
    ),
    // Assets
    (
        "asset_type",
        enum_field(
            "DEAL_SETS/DEAL_SET/DEALS/DEAL/ASSETS/ASSET/ASSET_DETAIL/AssetType",
            "AssetType",
            false,
        ),
    ),
    (
        "asset_balance",
        FieldMapping {
            mismo_path: "DEAL_SETS/DEAL_SET/DEALS/DEAL/ASSETS/ASSET/ASSET_DETAIL/AssetCashOrMarketValueAmount",
            datatype: Datatype::Amount,
            enum_type: None,
            required: false,
            required_if: Some(RequiredIf::present("asset_type")),
        },
    ),
];

pub fn field_mapping(field: &str) -> Option<&'static FieldMapping> {
    FIELD_MAPPINGS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, mapping)| mapping)
}

/// Groups of the business-purpose application (BPA) coverage test.
pub const BPA_FIELD_GROUPS: &[(&str, &[&str])] = &[
    (
        "loan",
        &[
            "loan_amount",
            "loan_purpose",
            "loan_term_months",
            "interest_rate",
            "amortization_type",
            "mortgage_type",
            "application_date",
            "dscr_ratio",
            "exit_strategy",
        ],
    ),
    (
        "property",
        &[
            "property_street",
            "property_city",
            "property_state",
            "property_zip",
            "property_usage",
            "property_estate_type",
            "construction_method",
            "attachment_type",
            "estimated_value",
            "purchase_price",
        ],
    ),
    (
        "borrower",
        &[
            "borrower_first_name",
            "borrower_last_name",
            "ssn_encrypted",
            "date_of_birth",
            "citizenship_status",
            "marital_status",
        ],
    ),
    ("entity", &["entity_name", "entity_type", "ein"]),
    ("asset", &["asset_type", "asset_balance"]),
];

/// The BPA field list flattened in group order, with each field's group.
pub fn bpa_fields() -> impl Iterator<Item = (&'static str, &'static str)> {
    BPA_FIELD_GROUPS
        .iter()
        .flat_map(|(group, fields)| fields.iter().map(move |field| (*group, *field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ldd_enum;
    use std::collections::HashSet;

    const LOAN: &str = "DEAL_SETS/DEAL_SET/DEALS/DEAL/LOANS/LOAN";
    const PROPERTY: &str = "DEAL_SETS/DEAL_SET/DEALS/DEAL/COLLATERALS/COLLATERAL/SUBJECT_PROPERTY";
    const PARTY: &str = "DEAL_SETS/DEAL_SET/DEALS/DEAL/PARTIES/PARTY";
    const ASSET: &str = "DEAL_SETS/DEAL_SET/DEALS/DEAL/ASSETS/ASSET";

    #[test]
    fn test_field_names_are_unique() {
        let mut seen = HashSet::new();
        for (name, _) in FIELD_MAPPINGS {
            assert!(seen.insert(*name), "duplicate mapping for {name}");
        }
    }

    #[test]
    fn test_paths_live_under_known_aggregates() {
        for (name, mapping) in FIELD_MAPPINGS {
            assert!(
                [LOAN, PROPERTY, PARTY, ASSET]
                    .iter()
                    .any(|root| mapping.mismo_path.starts_with(root)),
                "{name} maps outside the DEAL aggregates: {}",
                mapping.mismo_path
            );
        }
    }

    #[test]
    fn test_enum_fields_reference_ldd_keys() {
        for (name, mapping) in FIELD_MAPPINGS {
            match (mapping.datatype, mapping.enum_type) {
                (Datatype::Enum, Some(key)) => {
                    assert!(ldd_enum(key).is_some(), "{name} uses unknown enum {key}")
                }
                (Datatype::Enum, None) => panic!("{name} is MISMOEnum without an enum type"),
                (_, Some(key)) => panic!("{name} has enum type {key} but datatype {}", mapping.datatype),
                (_, None) => {}
            }
        }
    }

    #[test]
    fn test_conditions_reference_mapped_fields() {
        for (name, mapping) in FIELD_MAPPINGS {
            if let Some(condition) = mapping.required_if {
                assert!(
                    field_mapping(condition.field).is_some(),
                    "{name} depends on unmapped field {}",
                    condition.field
                );
            }
        }
    }

    #[test]
    fn test_bpa_list_has_thirty_fields() {
        assert_eq!(bpa_fields().count(), 30);
        let unmapped: Vec<_> = bpa_fields()
            .filter(|(_, field)| field_mapping(field).is_none())
            .map(|(_, field)| field)
            .collect();
        assert_eq!(unmapped, vec!["dscr_ratio", "exit_strategy"]);
    }

    #[test]
    fn test_mapping_serializes_camel_case_keys() {
        let mapping = field_mapping("purchase_price").unwrap();
        let value = serde_json::to_value(mapping).unwrap();
        assert!(value["mismoPath"].as_str().unwrap().ends_with("PurchasePriceAmount"));
        assert_eq!(value["datatype"], "MISMOAmount");
        assert_eq!(value["required"], false);
        assert_eq!(value["required_if"]["field"], "loan_purpose");
        assert!(value.get("enumType").is_none());
    }
}
