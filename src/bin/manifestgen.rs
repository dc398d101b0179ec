//! Manifestgen CLI
//!
//! usage: manifestgen VERSION NB_RECURSE
//! Silent on success unless --report is given.
//! Wrong argument count prints the usage line; exit 0 unless --strict-usage.
//! Hyphen-leading values such as `-rc1` count as positionals.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use manifestgen_core::{usage, Config, GenerateError, ManifestGenerator, ManifestRequest, ManifestSource};

#[derive(Parser)]
#[command(name = "manifestgen")]
#[command(about = "Render the highlight-regex package.json and write it minified")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// VERSION NB_RECURSE
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    args: Vec<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template path (default: the shipped templates/package.json.tmpl)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output path (default: package.json one directory above the template)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build the manifest from the builtin descriptor instead of a template
    #[arg(long)]
    builtin: bool,

    /// Exit non-zero when the argument count is wrong
    #[arg(long)]
    strict_usage: bool,

    /// Print the generation report as JSON on stdout
    #[arg(long)]
    report: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let mut config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => return fail(&GenerateError::from(e)),
        },
        None => Config::default(),
    };
    if cli.template.is_some() {
        config.template = cli.template.clone();
    }
    if cli.output.is_some() {
        config.output = cli.output.clone();
    }
    if cli.builtin {
        config.source = ManifestSource::Builtin;
    }
    config.strict_usage |= cli.strict_usage;

    let (version, nb_recurse) = match cli.args.as_slice() {
        [version, nb_recurse] => (version, nb_recurse),
        _ => {
            let program = std::env::args().next().unwrap_or_else(|| "manifestgen".to_string());
            println!("{}", usage(&program));
            return if config.strict_usage {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let request = match ManifestRequest::from_args(version, nb_recurse) {
        Ok(r) => r.with_source(config.source),
        Err(e) => return fail(&e),
    };

    let generator = ManifestGenerator::from_config(&config);

    match generator.generate(&request) {
        Ok(report) => {
            if cli.report {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => return fail(&GenerateError::from(e)),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fail(err: &GenerateError) -> ExitCode {
    eprintln!("error: {}", err);
    match err {
        GenerateError::ValidationFailed(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
