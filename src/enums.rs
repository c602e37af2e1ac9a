//! MISMO LDD enumerations and internal-to-MISMO enum translation.
//!
//! `LDD_ENUMS` holds the controlled vocabulary for every enum key the engine
//! checks. `ENUM_MAPS` pairs each key with the translation from the
//! application's internal literals; its MISMO side is always the `LDD_ENUMS`
//! list for the same key.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

pub const LOAN_PURPOSE_TYPE: &[&str] = &[
    "Purchase",
    "Refinance",
    "MortgageModification",
    "Other",
    "Unknown",
];

pub const PROPERTY_USAGE_TYPE: &[&str] = &["Investment", "PrimaryResidence", "SecondHome", "Other"];

pub const PROPERTY_ESTATE_TYPE: &[&str] = &["FeeSimple", "Leasehold", "Other"];

pub const CONSTRUCTION_METHOD_TYPE: &[&str] = &[
    "Manufactured",
    "MobileHome",
    "Modular",
    "OnFrameModular",
    "SiteBuilt",
    "Other",
];

pub const ATTACHMENT_TYPE: &[&str] = &["Attached", "Detached", "SemiDetached"];

pub const LEGAL_ENTITY_TYPE: &[&str] = &[
    "Corporation",
    "CorporationSole",
    "Estate",
    "GovernmentEntity",
    "JointVenture",
    "LimitedLiabilityCompany",
    "LimitedPartnership",
    "NonProfitCorporation",
    "Partnership",
    "SoleProprietorship",
    "Trust",
    "Other",
];

pub const CITIZENSHIP_RESIDENCY_TYPE: &[&str] = &[
    "USCitizen",
    "PermanentResidentAlien",
    "NonPermanentResidentAlien",
    "NonResidentAlien",
    "Unknown",
];

pub const MARITAL_STATUS_TYPE: &[&str] = &["Married", "Separated", "Unmarried", "Unknown"];

pub const ASSET_TYPE: &[&str] = &[
    "Bond",
    "BridgeLoanNotDeposited",
    "CertificateOfDepositTimeDeposit",
    "CheckingAccount",
    "IndividualDevelopmentAccount",
    "LifeInsurance",
    "MoneyMarketFund",
    "MutualFund",
    "RetirementFund",
    "SavingsAccount",
    "Stock",
    "StockOptions",
    "TrustAccount",
    "Other",
];

pub const MORTGAGE_TYPE: &[&str] = &[
    "Conventional",
    "FHA",
    "LocalAgency",
    "PublicAndIndianHousing",
    "StateAgency",
    "USDARuralDevelopment",
    "VA",
    "Other",
];

pub const AMORTIZATION_TYPE: &[&str] = &[
    "AdjustableRate",
    "Fixed",
    "GraduatedPaymentARM",
    "GraduatedPaymentMortgage",
    "GrowingEquityMortgage",
    "Step",
    "Other",
];

pub const PARTY_ROLE_TYPE: &[&str] = &[
    "Appraiser",
    "Borrower",
    "ClosingAgent",
    "Guarantor",
    "Lender",
    "LoanOriginationCompany",
    "LoanOriginator",
    "PropertySeller",
    "TitleCompany",
    "Other",
];

pub const STATE_CODE: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY", "AS", "GU", "MP", "PR", "VI",
];

/// Controlled vocabulary per enum key, in LDD order.
pub const LDD_ENUMS: &[(&str, &[&str])] = &[
    ("LoanPurposeType", LOAN_PURPOSE_TYPE),
    ("PropertyUsageType", PROPERTY_USAGE_TYPE),
    ("PropertyEstateType", PROPERTY_ESTATE_TYPE),
    ("ConstructionMethodType", CONSTRUCTION_METHOD_TYPE),
    ("AttachmentType", ATTACHMENT_TYPE),
    ("LegalEntityType", LEGAL_ENTITY_TYPE),
    ("CitizenshipResidencyType", CITIZENSHIP_RESIDENCY_TYPE),
    ("MaritalStatusType", MARITAL_STATUS_TYPE),
    ("AssetType", ASSET_TYPE),
    ("MortgageType", MORTGAGE_TYPE),
    ("AmortizationType", AMORTIZATION_TYPE),
    ("PartyRoleType", PARTY_ROLE_TYPE),
    ("StateCode", STATE_CODE),
];

const LOAN_PURPOSE_MAP: &[(&str, &str)] = &[
    ("purchase", "Purchase"),
    ("refinance", "Refinance"),
    ("rate_term_refinance", "Refinance"),
    ("cash_out_refinance", "Refinance"),
    ("cash_out", "Refinance"),
    ("modification", "MortgageModification"),
    ("construction", "Other"),
    ("bridge", "Other"),
    ("other", "Other"),
];

const PROPERTY_USAGE_MAP: &[(&str, &str)] = &[
    ("investment", "Investment"),
    ("investor", "Investment"),
    ("rental", "Investment"),
    ("primary", "PrimaryResidence"),
    ("primary_residence", "PrimaryResidence"),
    ("owner_occupied", "PrimaryResidence"),
    ("second_home", "SecondHome"),
    ("vacation_home", "SecondHome"),
    ("other", "Other"),
];

const PROPERTY_ESTATE_MAP: &[(&str, &str)] = &[
    ("fee_simple", "FeeSimple"),
    ("leasehold", "Leasehold"),
    ("other", "Other"),
];

const CONSTRUCTION_METHOD_MAP: &[(&str, &str)] = &[
    ("site_built", "SiteBuilt"),
    ("stick_built", "SiteBuilt"),
    ("manufactured", "Manufactured"),
    ("mobile_home", "MobileHome"),
    ("modular", "Modular"),
    ("on_frame_modular", "OnFrameModular"),
    ("other", "Other"),
];

const ATTACHMENT_MAP: &[(&str, &str)] = &[
    ("attached", "Attached"),
    ("detached", "Detached"),
    ("semi_detached", "SemiDetached"),
    ("townhouse", "Attached"),
    ("condo", "Attached"),
];

const LEGAL_ENTITY_MAP: &[(&str, &str)] = &[
    ("llc", "LimitedLiabilityCompany"),
    ("limited_liability_company", "LimitedLiabilityCompany"),
    ("corporation", "Corporation"),
    ("corp", "Corporation"),
    ("c_corp", "Corporation"),
    ("s_corp", "Corporation"),
    ("lp", "LimitedPartnership"),
    ("limited_partnership", "LimitedPartnership"),
    ("partnership", "Partnership"),
    ("general_partnership", "Partnership"),
    ("sole_proprietorship", "SoleProprietorship"),
    ("trust", "Trust"),
    ("estate", "Estate"),
    ("joint_venture", "JointVenture"),
    ("non_profit", "NonProfitCorporation"),
    ("other", "Other"),
];

const CITIZENSHIP_MAP: &[(&str, &str)] = &[
    ("us_citizen", "USCitizen"),
    ("citizen", "USCitizen"),
    ("permanent_resident", "PermanentResidentAlien"),
    ("green_card", "PermanentResidentAlien"),
    ("non_permanent_resident", "NonPermanentResidentAlien"),
    ("foreign_national", "NonResidentAlien"),
    ("non_resident_alien", "NonResidentAlien"),
    ("unknown", "Unknown"),
];

const MARITAL_STATUS_MAP: &[(&str, &str)] = &[
    ("married", "Married"),
    ("separated", "Separated"),
    ("unmarried", "Unmarried"),
    ("single", "Unmarried"),
    ("divorced", "Unmarried"),
    ("widowed", "Unmarried"),
    ("unknown", "Unknown"),
];

const ASSET_MAP: &[(&str, &str)] = &[
    ("checking", "CheckingAccount"),
    ("savings", "SavingsAccount"),
    ("money_market", "MoneyMarketFund"),
    ("cd", "CertificateOfDepositTimeDeposit"),
    ("mutual_fund", "MutualFund"),
    ("stock", "Stock"),
    ("stocks", "Stock"),
    ("stock_options", "StockOptions"),
    ("bond", "Bond"),
    ("bonds", "Bond"),
    ("retirement", "RetirementFund"),
    ("401k", "RetirementFund"),
    ("ira", "RetirementFund"),
    ("trust_account", "TrustAccount"),
    ("life_insurance", "LifeInsurance"),
    ("bridge_loan", "BridgeLoanNotDeposited"),
    ("other", "Other"),
];

const MORTGAGE_MAP: &[(&str, &str)] = &[
    ("conventional", "Conventional"),
    ("fha", "FHA"),
    ("va", "VA"),
    ("usda", "USDARuralDevelopment"),
    ("dscr", "Other"),
    ("bridge", "Other"),
    ("fix_and_flip", "Other"),
    ("non_qm", "Other"),
    ("commercial", "Other"),
    ("other", "Other"),
];

const AMORTIZATION_MAP: &[(&str, &str)] = &[
    ("fixed", "Fixed"),
    ("fixed_rate", "Fixed"),
    ("arm", "AdjustableRate"),
    ("adjustable", "AdjustableRate"),
    ("step", "Step"),
    ("interest_only", "Other"),
    ("other", "Other"),
];

const PARTY_ROLE_MAP: &[(&str, &str)] = &[
    ("borrower", "Borrower"),
    ("co_borrower", "Borrower"),
    ("guarantor", "Guarantor"),
    ("lender", "Lender"),
    ("broker", "LoanOriginationCompany"),
    ("loan_officer", "LoanOriginator"),
    ("seller", "PropertySeller"),
    ("title_company", "TitleCompany"),
    ("closing_agent", "ClosingAgent"),
    ("appraiser", "Appraiser"),
    ("other", "Other"),
];

const STATE_NAME_MAP: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("district_of_columbia", "DC"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new_hampshire", "NH"),
    ("new_jersey", "NJ"),
    ("new_mexico", "NM"),
    ("new_york", "NY"),
    ("north_carolina", "NC"),
    ("north_dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode_island", "RI"),
    ("south_carolina", "SC"),
    ("south_dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west_virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
    ("american_samoa", "AS"),
    ("guam", "GU"),
    ("northern_mariana_islands", "MP"),
    ("puerto_rico", "PR"),
    ("us_virgin_islands", "VI"),
];

const ENUM_TRANSLATIONS: &[(&str, &[(&str, &str)])] = &[
    ("LoanPurposeType", LOAN_PURPOSE_MAP),
    ("PropertyUsageType", PROPERTY_USAGE_MAP),
    ("PropertyEstateType", PROPERTY_ESTATE_MAP),
    ("ConstructionMethodType", CONSTRUCTION_METHOD_MAP),
    ("AttachmentType", ATTACHMENT_MAP),
    ("LegalEntityType", LEGAL_ENTITY_MAP),
    ("CitizenshipResidencyType", CITIZENSHIP_MAP),
    ("MaritalStatusType", MARITAL_STATUS_MAP),
    ("AssetType", ASSET_MAP),
    ("MortgageType", MORTGAGE_MAP),
    ("AmortizationType", AMORTIZATION_MAP),
    ("PartyRoleType", PARTY_ROLE_MAP),
    ("StateCode", STATE_NAME_MAP),
];

/// Bidirectional translation record for one enum key.
#[derive(Debug, Clone, Serialize)]
pub struct EnumMap {
    pub internal_to_mismo: BTreeMap<&'static str, &'static str>,
    pub mismo_values: &'static [&'static str],
}

impl EnumMap {
    /// Internal literals, sorted.
    pub fn internal_values(&self) -> Vec<&'static str> {
        self.internal_to_mismo.keys().copied().collect()
    }
}

static ENUM_MAPS: OnceLock<BTreeMap<&'static str, EnumMap>> = OnceLock::new();

/// The process-wide translation table, built once from the const tables.
pub fn enum_maps() -> &'static BTreeMap<&'static str, EnumMap> {
    ENUM_MAPS.get_or_init(|| {
        ENUM_TRANSLATIONS
            .iter()
            .filter_map(|(key, pairs)| {
                let mismo_values = ldd_enum(key)?;
                Some((
                    *key,
                    EnumMap {
                        internal_to_mismo: pairs.iter().copied().collect(),
                        mismo_values,
                    },
                ))
            })
            .collect()
    })
}

/// Allowed MISMO literals for an enum key.
pub fn ldd_enum(enum_type: &str) -> Option<&'static [&'static str]> {
    LDD_ENUMS
        .iter()
        .find(|(key, _)| *key == enum_type)
        .map(|(_, values)| *values)
}

/// Whether `value` is a member of the controlled vocabulary for `enum_type`.
///
/// Unknown enum keys have no members.
pub fn is_ldd_member(enum_type: &str, value: &str) -> bool {
    ldd_enum(enum_type).is_some_and(|values| values.iter().any(|member| *member == value))
}

pub fn enum_type_names() -> impl Iterator<Item = &'static str> {
    LDD_ENUMS.iter().map(|(key, _)| *key)
}

fn normalize_internal(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Translate an internal enum literal to its MISMO equivalent.
///
/// Lookup order: exact internal literal, normalized internal literal
/// (case, spaces and hyphens folded to snake_case), then an existing MISMO
/// literal of the same key (case-insensitive). Anything else is `None`: the
/// caller never receives the untranslated input back.
pub fn map_to_mismo(value: &str, enum_type: &str) -> Option<&'static str> {
    let map = enum_maps().get(enum_type)?;

    if let Some(mismo) = map.internal_to_mismo.get(value).copied() {
        return Some(mismo);
    }

    let normalized = normalize_internal(value);
    if let Some(mismo) = map.internal_to_mismo.get(normalized.as_str()).copied() {
        return Some(mismo);
    }

    let trimmed = value.trim();
    map.mismo_values
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
}
