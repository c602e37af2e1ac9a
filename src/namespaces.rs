//! Namespace declarations and vendor extension blocks.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix reported for a bare `xmlns="..."` declaration.
pub const DEFAULT_PREFIX: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub prefix: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSummary {
    #[serde(rename = "hasExtensions")]
    pub has_extensions: bool,
    pub count: usize,
    pub namespaces: Vec<NamespaceDecl>,
}

static XMLNS_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTENSION_REGEX: OnceLock<Regex> = OnceLock::new();
static VENDOR_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();

fn xmlns_regex() -> &'static Regex {
    XMLNS_REGEX.get_or_init(|| {
        Regex::new(r#"\bxmlns(?::([A-Za-z_][\w.\-]*))?\s*=\s*["']([^"']*)["']"#)
            .expect("Failed to compile xmlns regex")
    })
}

fn extension_regex() -> &'static Regex {
    EXTENSION_REGEX.get_or_init(|| {
        Regex::new(r"<EXTENSION[\s/>]").expect("Failed to compile extension regex")
    })
}

fn vendor_block_regex() -> &'static Regex {
    VENDOR_BLOCK_REGEX.get_or_init(|| {
        Regex::new(r#"<OTHER\b[^>]*?\bxmlns:([A-Za-z_][\w.\-]*)\s*=\s*["']([^"']*)["']"#)
            .expect("Failed to compile vendor extension regex")
    })
}

/// Every `xmlns` / `xmlns:prefix` declaration, in document order.
pub fn detect_namespaces(xml: &str) -> Vec<NamespaceDecl> {
    xmlns_regex()
        .captures_iter(xml)
        .map(|captures| NamespaceDecl {
            prefix: captures
                .get(1)
                .map_or(DEFAULT_PREFIX, |m| m.as_str())
                .to_string(),
            uri: captures.get(2).map_or("", |m| m.as_str()).to_string(),
        })
        .collect()
}

/// Summarize `<EXTENSION>` usage and vendor `<OTHER xmlns:...>` blocks.
///
/// `count` is the number of vendor blocks; a document with an `EXTENSION`
/// element but no vendor block counts as one.
pub fn detect_extensions(xml: &str) -> ExtensionSummary {
    let has_extensions = extension_regex().is_match(xml);
    let namespaces: Vec<NamespaceDecl> = vendor_block_regex()
        .captures_iter(xml)
        .map(|captures| NamespaceDecl {
            prefix: captures.get(1).map_or("", |m| m.as_str()).to_string(),
            uri: captures.get(2).map_or("", |m| m.as_str()).to_string(),
        })
        .collect();

    let count = match namespaces.len() {
        0 if has_extensions => 1,
        n => n,
    };

    ExtensionSummary {
        has_extensions,
        count,
        namespaces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_prefixed_namespaces() {
        let xml = r#"<MESSAGE xmlns="http://www.mismo.org/residential/2009/schemas" xmlns:xlink='http://www.w3.org/1999/xlink' xmlns:ULAD="http://www.datamodelextension.org/Schema/ULAD">"#;
        let namespaces = detect_namespaces(xml);
        assert_eq!(namespaces.len(), 3);
        assert_eq!(namespaces[0].prefix, "default");
        assert_eq!(namespaces[0].uri, "http://www.mismo.org/residential/2009/schemas");
        assert_eq!(namespaces[1].prefix, "xlink");
        assert_eq!(namespaces[2].prefix, "ULAD");
    }

    #[test]
    fn test_no_namespaces() {
        assert!(detect_namespaces("<LOAN><xmlnsish/></LOAN>").is_empty());
    }

    #[test]
    fn test_vendor_blocks_are_counted() {
        let xml = r#"<LOAN><EXTENSION>
  <OTHER xmlns:ULAD="http://www.datamodelextension.org/Schema/ULAD"><ULAD:X>1</ULAD:X></OTHER>
  <OTHER xmlns:DU="http://www.datamodelextension.org/Schema/DU"><DU:Y>2</DU:Y></OTHER>
</EXTENSION></LOAN>"#;
        let summary = detect_extensions(xml);
        assert!(summary.has_extensions);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.namespaces[1].prefix, "DU");
    }

    #[test]
    fn test_bare_extensions_count_as_one() {
        let summary = detect_extensions("<A><EXTENSION><X/></EXTENSION><EXTENSION/></A>");
        assert!(summary.has_extensions);
        assert_eq!(summary.count, 1);
        assert!(summary.namespaces.is_empty());

        let none = detect_extensions("<A><EXTENSIONS/></A>");
        assert_eq!(none, ExtensionSummary::default());
    }

    #[test]
    fn test_summary_wire_shape() {
        let value = serde_json::to_value(detect_extensions("<EXTENSION/>")).unwrap();
        assert_eq!(value["hasExtensions"], true);
        assert_eq!(value["count"], 1);
    }
}
