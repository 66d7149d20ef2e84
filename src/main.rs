//! apimodel-from-source - Command-line tool for extracting a normalized
//! API model from Django REST Framework projects.
//!
//! This binary scans a Django project's source tree, resolves serializer
//! and view declarations without importing any Python, and emits a
//! normalized App/Serializer/Endpoint model plus diagnostics.
//!
//! # Usage
//!
//! ```bash
//! apimodel-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Emit the model as YAML:
//! ```bash
//! apimodel-from-source ./my-django-project -o model.yaml
//! ```
//!
//! Emit JSON and restrict extraction to two apps:
//! ```bash
//! apimodel-from-source ./my-django-project -f json --include-apps products,orders
//! ```

use anyhow::Result;
use apimodel_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, then initialize the logger
    // before argument validation so validation failures are logged too
    let parsed = cli::CliArgs::parse();

    let log_level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apimodel-from-source starting...");

    let args = cli::parse_args_from_parsed(parsed)?;
    cli::run(args)?;

    info!("API model extraction completed successfully");

    Ok(())
}
