use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use regc_compiler::{gen_registry, GenOptions, RegistryError};
use regc_diagnostics::{DiagnosticEngine, Location};
use regc_document::DocumentError;
use regc_formatter::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "regc")]
#[command(version = "0.2.0")]
#[command(about = "Registry schema compiler: generates metadata and Fortran source from a registry", long_about = None)]
#[command(group(ArgGroup::new("verbosity").args(["debug", "quiet"])))]
struct Cli {
    /// Registry file
    #[arg(value_name = "REGISTRY")]
    registry_file: PathBuf,

    /// Dycore (EUL, FV, FV3, MPAS, SE, none)
    #[arg(long, value_name = "DYCORE")]
    dycore: String,

    /// Comma-separated config items (e.g., gravity_waves=True)
    #[arg(long, value_name = "CONFIG")]
    config: String,

    /// Directory where output files will be written (default: current directory)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Spaces per indent level in generated source
    /// (default: regcfmt.json in the output directory, else 3)
    #[arg(long)]
    indent: Option<usize>,

    /// Directory searched for registry schemas (repeatable)
    #[arg(long = "schema-path", value_name = "DIR")]
    schema_paths: Vec<PathBuf>,

    /// Fail instead of returning 1 when the registry does not validate
    #[arg(long)]
    error_on_no_validate: bool,

    /// Increase logging
    #[arg(long)]
    debug: bool,

    /// Disable logging except for errors
    #[arg(long)]
    quiet: bool,

    /// Output diagnostics as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Report a compilation failure as a diagnostic when it has one
fn report(err: &anyhow::Error, registry_file: &Path, json: bool) -> bool {
    let file = registry_file.display().to_string();
    let diagnostic = if let Some(e) = err.downcast_ref::<RegistryError>() {
        e.to_diagnostic(&file)
    } else if let Some(e) = err.downcast_ref::<DocumentError>() {
        e.to_diagnostic(Location::from_path(registry_file))
    } else {
        return false;
    };

    let mut engine = DiagnosticEngine::new();
    engine.emit(diagnostic);
    if json {
        match engine.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize diagnostics: {}", e),
        }
    } else {
        engine.print_all();
        engine.print_summary();
    }
    true
}

fn run(cli: &Cli) -> Result<i32> {
    let output_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let format = match cli.indent {
        Some(indent) => Config::default().with_indent_size(indent),
        None => Config::from_dir(&output_dir).unwrap_or_default(),
    };

    let mut options = GenOptions::new(&cli.dycore, &cli.config, output_dir);
    options.format = format;
    options.schema_paths = cli.schema_paths.clone();
    options.error_on_no_validate = cli.error_on_no_validate;

    gen_registry(&cli.registry_file, &options)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            if !report(&err, &cli.registry_file, cli.json) {
                log::error!("{:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_debug_and_quiet_conflict() {
        let result = Cli::try_parse_from([
            "regc", "registry.json", "--dycore", "se", "--config", "", "--debug", "--quiet",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_failure_is_reported_as_diagnostic() {
        let err = anyhow::Error::from(DocumentError::Invalid {
            path: PathBuf::from("registry.json"),
            messages: vec!["\"type\" is a required property at '/children/0/attributes'".to_string()],
        });
        assert!(report(&err, Path::new("registry.json"), true));

        let other = anyhow::anyhow!("Failed to read current directory");
        assert!(!report(&other, Path::new("registry.json"), true));
    }

    #[test]
    fn test_required_options() {
        assert!(Cli::try_parse_from(["regc", "registry.json", "--dycore", "se"]).is_err());

        let cli = Cli::try_parse_from([
            "regc",
            "registry.json",
            "--dycore",
            "SE",
            "--config",
            "gravity_waves=True",
            "--schema-path",
            "a",
            "--schema-path",
            "b",
        ])
        .unwrap();
        assert_eq!(cli.schema_paths.len(), 2);
        assert_eq!(cli.indent, None);
        assert!(!cli.error_on_no_validate);
    }
}
