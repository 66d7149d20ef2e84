//! Command-line interface and main workflow.

use crate::builder::ModelBuilder;
use crate::config::ProjectConfig;
use crate::model::Severity;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Extract a normalized API model from a Django REST Framework project
#[derive(Parser, Debug)]
#[command(name = "apimodel-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Django project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Project name placed in the emitted model
    #[arg(long = "project-name")]
    pub project_name: Option<String>,

    /// Only include these apps (comma-separated)
    #[arg(long = "include-apps", value_delimiter = ',')]
    pub include_apps: Vec<String>,

    /// Exclude these apps (comma-separated)
    #[arg(long = "exclude-apps", value_delimiter = ',')]
    pub exclude_apps: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Builds the extraction configuration from the parsed arguments.
pub fn config_from_args(args: &CliArgs) -> ProjectConfig {
    let mut config = ProjectConfig::default();
    if let Some(name) = &args.project_name {
        config.project_name = name.clone();
    } else if let Some(dir) = args.project_path.file_name().and_then(|n| n.to_str()) {
        config.project_name = dir.to_string();
    }
    if !args.include_apps.is_empty() {
        config.include_apps = Some(args.include_apps.clone());
    }
    config.exclude_apps.extend(args.exclude_apps.iter().cloned());
    config
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting API model extraction...");

    let config = config_from_args(&args);
    let builder = ModelBuilder::new(config);
    let extraction = builder.build(&args.project_path, None)?;

    for diagnostic in &extraction.diagnostics {
        match diagnostic.severity {
            Severity::Error | Severity::Warning => {
                warn!("[{}] {}", diagnostic.source, diagnostic.message)
            }
            Severity::Note => debug!("[{}] {}", diagnostic.source, diagnostic.message),
        }
    }

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&extraction)?,
        OutputFormat::Json => serialize_json(&extraction)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Wrote model to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    let model = &extraction.model;
    info!("Extraction complete!");
    info!("Summary:");
    info!("  - Apps: {}", model.apps.len());
    info!(
        "  - Serializers: {}",
        model.apps.iter().map(|a| a.serializers.len()).sum::<usize>()
    );
    info!(
        "  - Endpoints: {}",
        model.apps.iter().map(|a| a.endpoints.len()).sum::<usize>()
    );
    info!("  - Diagnostics: {}", extraction.diagnostics.len());

    Ok(())
}
