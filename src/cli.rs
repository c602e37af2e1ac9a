use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet,
    /// Show summaries
    #[default]
    Normal,
    /// Show every finding
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Report format for command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored, line-oriented text
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// One-line counts only
    Summary,
}

/// MISMO LDD validation and rules-mapping engine
#[derive(Parser, Debug, Clone)]
#[command(name = "ldd-rules")]
#[command(about = "Validate MISMO XML and map loan application data to the MISMO LDD")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Show every finding
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Only report errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP action endpoint
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8080
        #[arg(short = 'b', long = "bind")]
        bind: Option<String>,

        /// Number of HTTP worker threads
        #[arg(short = 'w', long = "workers")]
        workers: Option<usize>,

        /// Maximum request body size in bytes
        #[arg(long = "max-body-bytes")]
        max_body_bytes: Option<usize>,
    },

    /// Validate MISMO XML files or directories
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// File extensions to process (comma-separated)
        #[arg(short = 'e', long = "extensions", value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Maximum directory depth
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,

        /// Number of files checked concurrently
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,
    },

    /// Validate and map a JSON business object
    Transform {
        /// JSON file holding the internal field object
        input: PathBuf,
    },

    /// Report BPA field mapping coverage
    Coverage {
        /// Optional JSON object to validate alongside the report
        input: Option<PathBuf>,
    },

    /// List LDD enumerations
    Enums {
        /// Show only this enum key
        enum_type: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_parsing() {
        let cli = Cli::try_parse_from([
            "ldd-rules",
            "check",
            "loans/",
            "extra.xml",
            "-e",
            "xml,mismo",
            "--max-depth",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                paths,
                extensions,
                max_depth,
                jobs,
            } => {
                assert_eq!(paths, vec![PathBuf::from("loans/"), PathBuf::from("extra.xml")]);
                assert_eq!(extensions, Some(vec!["xml".to_string(), "mismo".to_string()]));
                assert_eq!(max_depth, Some(2));
                assert_eq!(jobs, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ldd-rules",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--format",
            "json",
            "--log-format",
            "compact",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.log_format, Some(LogFormat::Compact));
        assert_eq!(
            cli.command,
            Commands::Serve {
                bind: Some("0.0.0.0:9000".to_string()),
                workers: None,
                max_body_bytes: None,
            }
        );
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ldd-rules", "-v", "-q", "enums"]).is_err());
        let cli = Cli::try_parse_from(["ldd-rules", "-q", "enums", "StateCode"]).unwrap();
        assert_eq!(cli.verbosity(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(Cli::try_parse_from(["ldd-rules", "check"]).is_err());
    }
}
