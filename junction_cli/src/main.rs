use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use junction_config::{Config, ConfigError};
use junction_frr::{FrrError, generate_frr_config, generate_frr_config_file};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "config-compile")]
#[command(about = "Compile a set-style router configuration to frr.conf text")]
struct Cli {
    /// Source configuration file.
    config: PathBuf,

    /// Print the validated configuration tree as JSON instead of frr.conf.
    #[arg(long)]
    json: bool,

    /// Parse and validate only, produce no output.
    #[arg(long)]
    check: bool,

    /// Write frr.conf text to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

enum CliError {
    Config(ConfigError),
    Frr(FrrError),
    Io(String, std::io::Error),
}

impl CliError {
    fn report(&self) {
        match self {
            CliError::Config(err) => {
                eprintln!("error[{}]: {err}", err.code());
                eprintln!("  cause: {}", err.cause());
                eprintln!("  action: {}", err.action());
            }
            CliError::Frr(err) => {
                eprintln!("error[{}]: {err}", err.code());
            }
            CliError::Io(path, err) => {
                eprintln!("error: {path}: {err}");
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err)
    }
}

impl From<FrrError> for CliError {
    fn from(err: FrrError) -> Self {
        CliError::Frr(err)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        err.report();
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = fs::read_to_string(&cli.config)
        .map_err(|err| CliError::Io(cli.config.display().to_string(), err))?;

    let mut config: Config = junction_config::parse(&input)?;
    config.validate()?;
    debug!(path = %cli.config.display(), "configuration validated");

    if cli.check {
        return Ok(());
    }

    if cli.json {
        let tree = serde_json::to_string_pretty(&config)
            .map_err(|err| CliError::Frr(FrrError::GenerateFailed(err.to_string())))?;
        println!("{tree}");
        return Ok(());
    }

    let frr = generate_frr_config(&config)?;
    let text = generate_frr_config_file(&frr)?;

    match &cli.output {
        Some(path) => fs::write(path, &text)
            .map_err(|err| CliError::Io(path.display().to_string(), err))?,
        None => print!("{text}"),
    }

    Ok(())
}
