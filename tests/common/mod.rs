//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tokio::fs;

/// A complete, valid MISMO document using the LDD vocabulary.
pub const VALID_LOAN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MESSAGE xmlns="http://www.mismo.org/residential/2009/schemas" xmlns:ULAD="http://www.datamodelextension.org/Schema/ULAD">
  <DEAL_SETS>
    <DEAL_SET>
      <DEALS>
        <DEAL>
          <LOANS>
            <LOAN>
              <TERMS_OF_LOAN>
                <BaseLoanAmount>450000.00</BaseLoanAmount>
                <LoanPurposeType>Purchase</LoanPurposeType>
                <MortgageType>Conventional</MortgageType>
                <NoteRatePercent>7.2500</NoteRatePercent>
              </TERMS_OF_LOAN>
            </LOAN>
          </LOANS>
          <COLLATERALS>
            <COLLATERAL>
              <SUBJECT_PROPERTY>
                <ADDRESS>
                  <StateCode>CA</StateCode>
                  <PostalCode>94105</PostalCode>
                </ADDRESS>
              </SUBJECT_PROPERTY>
            </COLLATERAL>
          </COLLATERALS>
        </DEAL>
      </DEALS>
    </DEAL_SET>
  </DEAL_SETS>
</MESSAGE>"#;

pub const PURCHASE_XML: &str =
    "<LOAN><LOAN_PURPOSE><LoanPurposeType>Purchase</LoanPurposeType></LOAN_PURPOSE></LOAN>";

pub const VACATION_XML: &str =
    "<LOAN><LOAN_PURPOSE><LoanPurposeType>Vacation</LoanPurposeType></LOAN_PURPOSE></LOAN>";

/// A business-purpose application record with every required field.
pub fn purchase_application() -> Map<String, Value> {
    object(json!({
        "id": "app-1001",
        "created_date": "2026-01-05T10:00:00Z",
        "loan_amount": "$450,000",
        "loan_purpose": "purchase",
        "purchase_price": 500000,
        "interest_rate": "7.25%",
        "property_street": "100 Main St",
        "property_city": "San Francisco",
        "property_state": "california",
        "property_zip": "94105",
        "property_usage": "investment",
        "borrower_first_name": "Jordan",
        "borrower_last_name": "Lee",
        "is_self_employed": "yes",
        "entity_name": "Lee Holdings LLC",
        "entity_type": "llc",
        "ein": "12-3456789"
    }))
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Write `files` (relative path, content) under a fresh temp directory.
pub async fn write_tree(files: &[(&str, &str)]) -> std::io::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    for (relative, content) in files {
        let path = temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
    }
    Ok(temp_dir)
}

pub fn file_names(paths: &[PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            path.strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}
