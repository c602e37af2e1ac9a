//! # ldd-rules Library
//!
//! Validation and rules-mapping engine for MISMO 3.4 XML and the Loan
//! Delivery Dataset (LDD): enumeration and datatype checks over XML
//! documents, and translation of internal loan application records into
//! MISMO paths and vocabulary. Exposed through an HTTP action endpoint and
//! a command line tool.

pub mod cli;
pub mod config;
pub mod content;
pub mod datatypes;
pub mod enums;
pub mod error;
pub mod file_discovery;
pub mod hash;
pub mod issue;
pub mod logging;
pub mod mappings;
pub mod namespaces;
pub mod output;
pub mod rules_engine;
pub mod server;
pub mod validator;
pub mod well_formed;
pub mod xml_validator;

pub use cli::{Cli, Commands, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use content::{ContentFindings, validate_datatypes, validate_enum_values};
pub use datatypes::{Datatype, FormatError, FormatOptions, format_value, matches_datatype};
pub use enums::{EnumMap, enum_type_names, is_ldd_member, ldd_enum, map_to_mismo};
pub use error::{Result, RulesError};
pub use file_discovery::FileDiscovery;
pub use hash::compute_content_hash;
pub use issue::{IssueCategory, IssueCode, Severity, ValidationIssue};
pub use logging::{LogConfig, LogFormat, init_logging};
pub use mappings::{FIELD_MAPPINGS, FieldMapping, RequiredIf, field_mapping};
pub use namespaces::{ExtensionSummary, NamespaceDecl, detect_extensions, detect_namespaces};
pub use output::Output;
pub use rules_engine::{
    Action, CoverageReport, RulesRequest, TransformResult, check_enum, dispatch,
    run_bpa_mapping_test, validate_and_transform,
};
pub use validator::{CheckStatus, CheckSummary, DocumentValidator, FileCheckResult};
pub use well_formed::{WellFormedReport, check_well_formed};
pub use xml_validator::{XmlValidationReport, validate_xml};
