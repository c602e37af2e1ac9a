//! Stack-based tag nesting check.
//!
//! This is a tokenizer over tag-shaped text, not an XML parser: it verifies
//! that every start tag has a matching, properly nested end tag. Processing
//! instructions, comments, CDATA sections and declarations are skipped.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellFormedReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl WellFormedReport {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            line: None,
            column: None,
        }
    }

    fn fail(error: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            line: Some(line),
            column: Some(column),
        }
    }
}

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| {
        Regex::new(
            r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<\?.*?\?>|<![^>]*>|<(?P<close>/)?(?P<name>[A-Za-z_][\w:.\-]*)[^>]*?(?P<selfclose>/)?>",
        )
        .expect("Failed to compile tag regex")
    })
}

/// 1-based line and column of a byte offset into `text`.
///
/// The column counts characters, not bytes, from the start of the line.
pub(crate) fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

struct OpenTag<'a> {
    name: &'a str,
    offset: usize,
}

/// Verify tag nesting and closure.
pub fn check_well_formed(xml: &str) -> WellFormedReport {
    let trimmed = xml.trim_start();
    if !trimmed.starts_with('<') {
        return WellFormedReport::fail("Content is not XML: expected '<' at start", 1, 1);
    }

    let mut stack: Vec<OpenTag<'_>> = Vec::new();

    for captures in tag_regex().captures_iter(xml) {
        let Some(name) = captures.name("name") else {
            continue;
        };
        let offset = captures.get(0).map_or(0, |m| m.start());

        if captures.name("close").is_some() {
            match stack.pop() {
                Some(open) if open.name == name.as_str() => {}
                Some(open) => {
                    let (line, column) = line_and_column(xml, offset);
                    return WellFormedReport::fail(
                        format!(
                            "Mismatched closing tag </{}>: expected </{}>",
                            name.as_str(),
                            open.name
                        ),
                        line,
                        column,
                    );
                }
                None => {
                    let (line, column) = line_and_column(xml, offset);
                    return WellFormedReport::fail(
                        format!("Unexpected closing tag </{}>", name.as_str()),
                        line,
                        column,
                    );
                }
            }
        } else if captures.name("selfclose").is_none() {
            stack.push(OpenTag {
                name: name.as_str(),
                offset,
            });
        }
    }

    match stack.last() {
        Some(open) => {
            let (line, column) = line_and_column(xml, open.offset);
            WellFormedReport::fail(format!("Unclosed tag <{}>", open.name), line, column)
        }
        None => WellFormedReport::ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_document_is_valid() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- loan file -->
<MESSAGE xmlns="http://www.mismo.org/residential/2009/schemas">
  <DEAL>
    <LOANS><LOAN><Empty/></LOAN></LOANS>
  </DEAL>
</MESSAGE>"#;
        let report = check_well_formed(xml);
        assert_eq!(report, WellFormedReport::ok());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, serde_json::json!({ "valid": true }));
    }

    #[test]
    fn test_mismatched_close_names_offending_tag() {
        let report = check_well_formed("<A><B></A></B>");
        assert!(!report.valid);
        assert!(report.error.as_deref().unwrap().contains("</A>"));
        assert_eq!(report.line, Some(1));
        assert_eq!(report.column, Some(7));
    }

    #[test]
    fn test_unexpected_close_on_second_line() {
        let report = check_well_formed("<A></A>\n  </B>");
        assert!(!report.valid);
        assert!(report.error.unwrap().contains("Unexpected closing tag </B>"));
        assert_eq!((report.line, report.column), (Some(2), Some(3)));
    }

    #[test]
    fn test_unclosed_tag_reports_opening_position() {
        let report = check_well_formed("<LOAN>\n  <TERMS>\n</LOAN>");
        // </LOAN> meets the open <TERMS> first
        assert!(report.error.unwrap().contains("expected </TERMS>"));

        let report = check_well_formed("<LOAN>\n  <TERMS>\n  </TERMS>\n");
        assert!(!report.valid);
        assert_eq!(report.error.as_deref(), Some("Unclosed tag <LOAN>"));
        assert_eq!((report.line, report.column), (Some(1), Some(1)));
    }

    #[test]
    fn test_non_xml_input_rejected_at_origin() {
        for input in ["", "   ", "hello <A></A>", "{\"json\": true}"] {
            let report = check_well_formed(input);
            assert!(!report.valid, "{input:?} should be rejected");
            assert_eq!((report.line, report.column), (Some(1), Some(1)));
        }
    }

    #[test]
    fn test_multiline_start_tag_and_skipped_tokens() {
        let xml = "<ROOT\n  a=\"1\"\n  b=\"2\">\n<![CDATA[<notatag>]]><!-- <B> --><?pi x?></ROOT>";
        assert!(check_well_formed(xml).valid);
    }

    #[test]
    fn test_line_and_column_counts_characters() {
        let text = "é<A>\nxyz<B>";
        let offset = text.find("<B>").unwrap();
        assert_eq!(line_and_column(text, offset), (2, 4));
        assert_eq!(line_and_column(text, text.find("<A>").unwrap()), (1, 2));
    }
}
