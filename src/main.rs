//! Swagger 2.0 generator - command-line frontend.
//!
//! Reads an API manifest describing endpoints and their serializer field
//! trees, infers a complete Swagger 2.0 document, validates it, and writes
//! JSON or YAML.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! swagger-from-routes api.yaml -o swagger.yaml
//! ```
//!
//! Generate minified JSON without validation:
//! ```bash
//! swagger-from-routes api.yaml -f json --validator none -o swagger.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_routes::cli;

fn main() -> Result<()> {
    // Parse args twice: once to get the verbose flag, then again (with
    // validation) after logger init
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
