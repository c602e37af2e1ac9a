use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use serde_json::{Map, Value};

use ldd_rules::config::{Config, ConfigManager};
use ldd_rules::rules_engine::enum_listings;
use ldd_rules::server::build_server;
use ldd_rules::{
    Cli, Commands, DocumentValidator, FileDiscovery, LogConfig, LogFormat, Output, RulesError,
    VerbosityLevel, init_logging, run_bpa_mapping_test, validate_and_transform,
};

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();
    let config = ConfigManager::load_config(&cli)
        .await
        .context("Failed to load configuration")?;

    let log_config = LogConfig::from_settings(&config.logging.level, config.logging.format)
        .with_ansi(config.logging.format != LogFormat::Json && atty::is(atty::Stream::Stderr));
    init_logging(&log_config).context("Failed to initialise logging")?;

    let output = Output::new(
        config.output.format.into(),
        VerbosityLevel::from_flags(config.output.verbose, config.output.quiet),
    );

    match cli.command {
        Commands::Serve { .. } => run_server(&config).await,
        Commands::Check { paths, .. } => run_check(&config, &output, &paths).await,
        Commands::Transform { input } => {
            let data = read_json_object(&input).await?;
            let result = validate_and_transform(&data);
            emit(&output.format_transform(&result)?);
            Ok(exit_code(result.valid))
        }
        Commands::Coverage { input } => {
            let data = match input {
                Some(path) => Some(read_json_object(&path).await?),
                None => None,
            };
            let report = run_bpa_mapping_test(data.as_ref());
            emit(&output.format_coverage(&report)?);
            let valid = report.validation_result.as_ref().is_none_or(|result| result.valid);
            Ok(exit_code(valid))
        }
        Commands::Enums { enum_type } => {
            let mut listings = enum_listings();
            if let Some(enum_type) = enum_type {
                listings.retain(|key, _| *key == enum_type);
                if listings.is_empty() {
                    return Err(RulesError::UnknownEnumType(enum_type).into());
                }
            }
            emit(&output.format_enums(&listings)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_server(config: &Config) -> anyhow::Result<ExitCode> {
    let listener = TcpListener::bind(&config.server.bind_address)
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    let workers = ConfigManager::get_worker_count(config);

    build_server(listener, &config.server, workers)?.await?;
    tracing::info!("HTTP server stopped");
    Ok(ExitCode::SUCCESS)
}

async fn run_check(config: &Config, output: &Output, paths: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let discovery = FileDiscovery::new()
        .with_extensions(config.files.extensions.clone())
        .with_max_depth(config.files.max_depth);
    let validator = DocumentValidator::new(discovery, ConfigManager::get_job_count(config));

    let summary = validator.check_paths(paths).await?;
    emit(&output.format_check(&summary)?);
    Ok(exit_code(!summary.has_errors()))
}

async fn read_json_object(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content).with_context(|| format!("Invalid JSON in {}", path.display()))? {
        Value::Object(data) => Ok(data),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn emit(text: &str) {
    let text = text.trim_end();
    if !text.is_empty() {
        println!("{text}");
    }
}

fn exit_code(valid: bool) -> ExitCode {
    if valid { ExitCode::SUCCESS } else { ExitCode::from(1) }
}
