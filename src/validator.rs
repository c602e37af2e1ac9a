//! Concurrent validation of MISMO documents on disk.
//!
//! Each file is read with `tokio::fs` and checked by
//! [`validate_xml`](crate::xml_validator::validate_xml) inside its own
//! `tokio::spawn` task. A semaphore bounds how many files are in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{Result, RulesError};
use crate::file_discovery::FileDiscovery;
use crate::xml_validator::{XmlValidationReport, validate_xml};

/// Outcome of checking one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckStatus {
    /// No errors (warnings allowed)
    Valid,
    /// Malformed or carrying LDD errors
    Invalid { error_count: usize },
    /// File could not be read
    Error { message: String },
}

impl CheckStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckStatus::Valid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCheckResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: CheckStatus,
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<XmlValidationReport>,
}

impl FileCheckResult {
    fn from_report(path: PathBuf, report: XmlValidationReport, duration: Duration) -> Self {
        let status = if report.valid {
            CheckStatus::Valid
        } else {
            CheckStatus::Invalid {
                error_count: report.error_count(),
            }
        };
        Self {
            path,
            status,
            duration,
            report: Some(report),
        }
    }

    fn error(path: PathBuf, error: impl ToString, duration: Duration) -> Self {
        Self {
            path,
            status: CheckStatus::Error {
                message: error.to_string(),
            },
            duration,
            report: None,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.report.as_ref().map_or(0, XmlValidationReport::warning_count)
    }
}

/// Aggregated results of checking multiple files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSummary {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    pub total_warnings: usize,
    pub total_duration: Duration,
    pub file_results: Vec<FileCheckResult>,
}

impl CheckSummary {
    pub fn aggregate(file_results: Vec<FileCheckResult>, total_duration: Duration) -> Self {
        let mut valid_files = 0;
        let mut invalid_files = 0;
        let mut error_files = 0;
        let mut total_warnings = 0;

        for result in &file_results {
            match result.status {
                CheckStatus::Valid => valid_files += 1,
                CheckStatus::Invalid { .. } => invalid_files += 1,
                CheckStatus::Error { .. } => error_files += 1,
            }
            total_warnings += result.warning_count();
        }

        Self {
            total_files: file_results.len(),
            valid_files,
            invalid_files,
            error_files,
            total_warnings,
            total_duration,
            file_results,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.invalid_files > 0 || self.error_files > 0
    }
}

/// Checks documents concurrently with bounded parallelism
pub struct DocumentValidator {
    discovery: FileDiscovery,
    max_concurrent: usize,
}

impl DocumentValidator {
    pub fn new(discovery: FileDiscovery, max_concurrent: usize) -> Self {
        Self {
            discovery,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Discover and check every document under `paths`.
    pub async fn check_paths(&self, paths: &[PathBuf]) -> Result<CheckSummary> {
        let started = Instant::now();
        let files = self.discovery.discover_all(paths).await?;
        tracing::info!(files = files.len(), "discovered documents");

        let results = self.check_files(files).await?;
        Ok(CheckSummary::aggregate(results, started.elapsed()))
    }

    /// Check files concurrently; results keep the input order.
    pub async fn check_files(&self, files: Vec<PathBuf>) -> Result<Vec<FileCheckResult>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        let tasks: Vec<_> = files
            .into_iter()
            .map(|path| {
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|_| {
                        RulesError::Concurrency {
                            details: "validation semaphore closed".to_string(),
                        }
                    })?;
                    Ok::<_, RulesError>(Self::check_file(&path).await)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let result = task.await.map_err(|e| RulesError::Concurrency {
                details: format!("Task join error: {}", e),
            })??;
            results.push(result);
        }

        Ok(results)
    }

    /// Read and check a single document.
    pub async fn check_file(path: &Path) -> FileCheckResult {
        let started = Instant::now();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let report = validate_xml(&content);
                tracing::debug!(
                    path = %path.display(),
                    valid = report.valid,
                    errors = report.error_count(),
                    warnings = report.warning_count(),
                    "checked document"
                );
                FileCheckResult::from_report(path.to_path_buf(), report, started.elapsed())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read document");
                FileCheckResult::error(path.to_path_buf(), e, started.elapsed())
            }
        }
    }
}
