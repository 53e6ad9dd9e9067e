//! CLI entry point for `eml-json-extract`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use eml_json_extract::{Config, ExtractError, Extractor, LinkPattern, UploadRules, server};

#[derive(Parser)]
#[command(name = "eml-json-extract", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "EML_JSON_EXTRACT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /parse-email
    Serve {
        /// Address to listen on, overriding the config
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Extract the JSON payload of a local .eml file
    Extract {
        path: PathBuf,

        /// Which body links to follow: json-suffix, drive-view or either
        #[arg(short, long)]
        pattern: Option<LinkPattern>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Extract { path, pattern } => {
            if let Some(pattern) = pattern {
                config.links.pattern = pattern;
            }
            cmd_extract(&config, &path)
        }
    }
}

/// Print the payload of a local email, exiting non-zero when none is found.
fn cmd_extract(config: &Config, path: &Path) -> anyhow::Result<ExitCode> {
    UploadRules::from(&config.intake).check_filename(&path.to_string_lossy())?;
    let extractor = Extractor::from_config(config)?;

    match extractor.extract_file(path) {
        Ok(extraction) => {
            tracing::debug!(source = %extraction.source, "Payload source");
            println!("{}", serde_json::to_string_pretty(&extraction.payload)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ExtractError::NotFound) => {
            eprintln!("{}: JSON not found", path.display());
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
