//! Command-line interface.

use crate::cache::{CacheKey, SpecCache};
use crate::codec::{self, EncoderConfig, Format, SpecValidator};
use crate::manifest::Manifest;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Swagger 2.0 generator - build a validated API document from a manifest
#[derive(Parser, Debug)]
#[command(name = "swagger-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the API manifest (YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Validators to run before emitting (repeatable)
    #[arg(long = "validator", value_enum, default_values = ["structure", "meta-schema"])]
    pub validators: Vec<ValidatorChoice>,

    /// Skip the encoded-document cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,

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

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Format {
        match format {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

/// Validator selection
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ValidatorChoice {
    /// Disable validation entirely
    None,
    /// Structural checks (parameter identity, $ref targets, response keys)
    Structure,
    /// The embedded Swagger 2.0 meta-schema
    #[value(name = "meta-schema")]
    MetaSchema,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest file does not exist: {}",
            args.manifest_path.display()
        );
    }
    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest path is not a file: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Map the CLI validator choices onto codec validators. `none` wins over
/// everything else.
fn selected_validators(choices: &[ValidatorChoice]) -> Vec<SpecValidator> {
    if choices.contains(&ValidatorChoice::None) {
        return Vec::new();
    }
    let mut validators = Vec::new();
    for choice in choices {
        let validator = match choice {
            ValidatorChoice::Structure => SpecValidator::Structure,
            ValidatorChoice::MetaSchema => SpecValidator::MetaSchema,
            ValidatorChoice::None => continue,
        };
        if !validators.contains(&validator) {
            validators.push(validator);
        }
    }
    validators
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading manifest...");
    let manifest = Manifest::load(&args.manifest_path)?;
    info!("Manifest declares {} endpoints", manifest.endpoints.len());

    let format = Format::from(args.output_format);
    let config = EncoderConfig {
        security_definitions: manifest.security_definitions.clone(),
        validators: selected_validators(&args.validators),
    };

    info!("Assembling Swagger document...");
    let swagger = manifest.build_swagger()?;
    info!(
        "Document built: {} paths, {} definitions",
        swagger.paths.len(),
        swagger
            .definitions
            .as_ref()
            .map(|d| d.len())
            .unwrap_or(0)
    );

    info!("Encoding to {} with {} validators...", format, config.validators.len());
    let bytes = if args.no_cache {
        codec::encode(&swagger, format, &config)?
    } else {
        // process-wide, so repeated invocations through the library reuse
        // the encoded bytes
        static CACHE: OnceLock<SpecCache> = OnceLock::new();
        let cache = CACHE.get_or_init(SpecCache::new);
        let key = CacheKey::new(format, &manifest_fingerprint(&args.manifest_path, &manifest));
        let cached = cache.get_or_compute(key, || codec::encode(&swagger, format, &config))?;
        cached.as_ref().clone()
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        std::fs::write(output_path, &bytes)?;
        info!("Successfully wrote document to {}", output_path.display());
    } else {
        std::io::stdout().write_all(&bytes)?;
    }

    info!("Generation complete!");
    Ok(())
}

/// Scope fingerprint for the cache key, derived from the manifest identity.
fn manifest_fingerprint(path: &PathBuf, manifest: &Manifest) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    manifest.info.title.hash(&mut hasher);
    manifest.info.version.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
