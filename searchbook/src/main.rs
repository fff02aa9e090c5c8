use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use searchbook_core::{BuildConfig, Searchbook, UnmatchedPolicy};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

mod formatter;

const DEFAULT_CONFIG_FILE: &str = "searchbook.toml";

#[derive(Parser)]
#[command(name = "searchbook")]
#[command(about = "Merge CSV exports into a searchable Excel workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Workbook to create
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Give unmatched CSV files their own sheet instead of skipping them
    #[arg(long)]
    catch_all: bool,

    /// Fail when no license file is present
    #[arg(long)]
    require_license: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Plan and report without writing the workbook
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so the JSON report on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<BuildConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        BuildConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_config_path.exists() {
            BuildConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            BuildConfig::default()
        }
    };

    // Command line flags win over the file
    if let Some(input) = &cli.input {
        config.input_dir = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_file = output.clone();
    }
    if cli.catch_all {
        config.unmatched = UnmatchedPolicy::CatchAll;
    }
    if cli.require_license {
        config.require_license = true;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let input_dir = config.input_dir.clone();
    let output_file = config.output_file.clone();

    let searchbook = Searchbook::new(config).context("Invalid configuration")?;

    let report = if cli.dry_run {
        searchbook
            .dry_run()
            .with_context(|| format!("Failed to plan workbook from {}", input_dir.display()))?
    } else {
        searchbook.build().with_context(|| {
            format!(
                "Failed to build {} from {}",
                output_file.display(),
                input_dir.display()
            )
        })?
    };

    match cli.format {
        OutputFormat::Human => formatter::print_human(&report),
        OutputFormat::Json => formatter::print_json(&report)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "searchbook",
            "--input",
            "exports",
            "--output",
            "out.xlsx",
            "--catch-all",
            "--require-license",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("exports"));
        assert_eq!(config.output_file, PathBuf::from("out.xlsx"));
        assert_eq!(config.unmatched, UnmatchedPolicy::CatchAll);
        assert!(config.require_license);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["searchbook", "--config", "no/such/searchbook.toml"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
