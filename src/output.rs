//! Output formatting for command line reports.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::Result;
use crate::issue::ValidationIssue;
use crate::rules_engine::{CoverageReport, EnumListing, TransformResult};
use crate::validator::{CheckStatus, CheckSummary, FileCheckResult};

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const CYAN: &str = "36";

/// Renders reports as human text, JSON, or a one-line summary
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.show_colors = enable;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn json<T: Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    pub fn format_check(&self, summary: &CheckSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(summary),
            OutputFormat::Summary => Ok(format!(
                "files={} valid={} invalid={} errors={} warnings={}",
                summary.total_files,
                summary.valid_files,
                summary.invalid_files,
                summary.error_files,
                summary.total_warnings
            )),
            OutputFormat::Human => {
                let mut output = String::new();
                for result in &summary.file_results {
                    if self.verbosity == VerbosityLevel::Quiet && result.status.is_valid() {
                        continue;
                    }
                    output.push_str(&self.format_file_result(result));
                    output.push('\n');
                }
                if self.verbosity > VerbosityLevel::Quiet {
                    output.push_str(&self.format_check_totals(summary));
                }
                Ok(output)
            }
        }
    }

    fn format_file_result(&self, result: &FileCheckResult) -> String {
        let path = result.path.display();
        let duration = format_duration(result.duration);

        let mut output = match &result.status {
            CheckStatus::Valid => format!("{}  {} ({})", self.colorize("✓ VALID", GREEN), path, duration),
            CheckStatus::Invalid { error_count } => format!(
                "{}  {} ({}) - {} error{}",
                self.colorize("✗ INVALID", RED),
                path,
                duration,
                error_count,
                if *error_count == 1 { "" } else { "s" }
            ),
            CheckStatus::Error { message } => format!(
                "{}  {} ({}) - {}",
                self.colorize("⚠ ERROR", YELLOW),
                path,
                duration,
                message
            ),
        };

        if let Some(report) = &result.report {
            for issue in &report.errors {
                output.push_str(&format!("\n    {}", self.format_issue(issue)));
            }
            if self.verbosity >= VerbosityLevel::Verbose {
                for issue in &report.warnings {
                    output.push_str(&format!("\n    {}", self.format_issue(issue)));
                }
                output.push_str(&format!("\n    sha256 {}", report.content_hash));
            }
        }
        output
    }

    fn format_check_totals(&self, summary: &CheckSummary) -> String {
        let mut output = String::from("Check Summary:\n");
        output.push_str(&format!("  Total files: {}\n", summary.total_files));
        output.push_str(&format!("  {} {}\n", self.colorize("Valid:", GREEN), summary.valid_files));
        if summary.invalid_files > 0 {
            output.push_str(&format!("  {} {}\n", self.colorize("Invalid:", RED), summary.invalid_files));
        }
        if summary.error_files > 0 {
            output.push_str(&format!("  {} {}\n", self.colorize("Errors:", YELLOW), summary.error_files));
        }
        if summary.total_warnings > 0 {
            output.push_str(&format!("  Warnings: {}\n", summary.total_warnings));
        }
        output.push_str(&format!("  Duration: {}\n", format_duration(summary.total_duration)));
        output
    }

    fn format_issue(&self, issue: &ValidationIssue) -> String {
        let label = if issue.is_error() {
            self.colorize("error", RED)
        } else {
            self.colorize("warning", YELLOW)
        };
        let mut line = format!("{label} {issue}");
        if let Some(xpath) = &issue.xpath {
            line.push_str(&format!(" ({xpath})"));
        }
        line
    }

    pub fn format_transform(&self, result: &TransformResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(result),
            OutputFormat::Summary => Ok(format!(
                "valid={} processed={} mapped={} errors={} warnings={}",
                result.valid,
                result.fields_processed,
                result.fields_mapped,
                result.errors.len(),
                result.warnings.len()
            )),
            OutputFormat::Human => {
                let status = if result.valid {
                    self.colorize("✓ VALID", GREEN)
                } else {
                    self.colorize("✗ INVALID", RED)
                };
                let mut output = format!(
                    "{}  {} of {} fields mapped\n",
                    status, result.fields_mapped, result.fields_processed
                );
                for issue in &result.errors {
                    output.push_str(&format!("  {}\n", self.format_issue(issue)));
                }
                if self.verbosity > VerbosityLevel::Quiet {
                    for issue in &result.warnings {
                        output.push_str(&format!("  {}\n", self.format_issue(issue)));
                    }
                }
                if self.verbosity >= VerbosityLevel::Verbose {
                    for value in &result.mismo_data {
                        output.push_str(&format!(
                            "  {} = {}\n",
                            self.colorize(&value.mismo_path, CYAN),
                            value.value
                        ));
                    }
                }
                Ok(output)
            }
        }
    }

    pub fn format_coverage(&self, report: &CoverageReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(report),
            OutputFormat::Summary => Ok(format!(
                "coverage={}% mapped={} total={}",
                report.coverage_percent, report.mapped_fields, report.total_fields
            )),
            OutputFormat::Human => {
                let mut output = format!(
                    "BPA mapping coverage: {}% ({} of {} fields)\n",
                    report.coverage_percent, report.mapped_fields, report.total_fields
                );
                if !report.unmapped_fields.is_empty() {
                    output.push_str(&format!(
                        "  {} {}\n",
                        self.colorize("Unmapped:", YELLOW),
                        report.unmapped_fields.join(", ")
                    ));
                }
                if self.verbosity >= VerbosityLevel::Verbose {
                    for detail in &report.field_details {
                        let target = detail
                            .mapping
                            .as_ref()
                            .map_or("-", |mapping| mapping.mismo_path);
                        output.push_str(&format!("  [{}] {} -> {}\n", detail.group, detail.field, target));
                    }
                }
                if let Some(result) = &report.validation_result {
                    output.push_str(&self.format_transform(result)?);
                }
                Ok(output)
            }
        }
    }

    pub fn format_enums(&self, enums: &BTreeMap<&str, EnumListing>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(enums),
            OutputFormat::Summary => Ok(enums
                .iter()
                .map(|(key, listing)| format!("{}={}", key, listing.mismo_values.len()))
                .collect::<Vec<_>>()
                .join(" ")),
            OutputFormat::Human => {
                let mut output = String::new();
                for (key, listing) in enums {
                    output.push_str(&format!("{}\n", self.colorize(key, CYAN)));
                    output.push_str(&format!("  MISMO: {}\n", listing.mismo_values.join(", ")));
                    if self.verbosity >= VerbosityLevel::Verbose {
                        output.push_str(&format!(
                            "  internal: {}\n",
                            listing.internal_values.join(", ")
                        ));
                    }
                }
                Ok(output)
            }
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
