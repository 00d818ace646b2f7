//! Metatype Extraction CLI
//!
//! Reads type descriptors and prints the object class definition of a root type.

use anyhow::{Context, Result};
use clap::Parser;
use metatype_schemas::{
    descriptor, ExtractOption, MetatypeConfig, MetatypeVersion, OcdReader, OutputFormat,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metatype-extract")]
#[command(about = "Extract a metatype object class definition from type descriptors")]
struct Cli {
    /// Descriptor file or directory of *.json descriptors
    #[arg(short, long)]
    types: PathBuf,

    /// Fully qualified name of the root type
    #[arg(short, long)]
    root: String,

    /// Accept interface-typed members
    #[arg(long)]
    nested: bool,

    /// Lowest version the output declares (1.2, 1.3, 1.4)
    #[arg(long)]
    min_version: Option<String>,

    /// Config file
    #[arg(short, long)]
    config: Option<String>,

    /// Output file (JSON), stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compact JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = MetatypeConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let source = if cli.types.is_dir() {
        descriptor::load_from_directory(&cli.types)
    } else {
        descriptor::load_from_file(&cli.types)
    }
    .with_context(|| format!("loading descriptors from {}", cli.types.display()))?;
    info!(types = source.len(), "loaded type descriptors");

    let mut options = config.options();
    if cli.nested {
        options.insert(ExtractOption::Nested);
    }
    let min_version = match &cli.min_version {
        Some(v) => MetatypeVersion::parse(v)?,
        None => config.min_version()?,
    };
    let recognizer = config.recognizer();

    let extraction = OcdReader::new(&source)
        .with_options(options)
        .with_min_version(min_version)
        .with_recognizer(&recognizer)
        .with_platform_packages(config.extract.platform_packages.clone())
        .extract(&cli.root);

    let compact = cli.compact || config.output.format == OutputFormat::Compact;
    let json = if compact {
        serde_json::to_string(&extraction)?
    } else {
        serde_json::to_string_pretty(&extraction)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote extraction");
        }
        None => println!("{}", json),
    }

    for item in extraction.diagnostics.items() {
        eprintln!("{}", item);
    }

    if extraction.diagnostics.has_errors() {
        return Ok(1);
    }
    if extraction.ocd.is_none() {
        eprintln!("{} is not an object class definition", cli.root);
        return Ok(2);
    }
    Ok(0)
}
