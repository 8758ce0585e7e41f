use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lti_app::{AppError, AppResult, EngineConfig, Endpoint, dispatch, load_config};
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lti-cli")]
#[command(about = "LTI control-system analysis and compensator design", long_about = None)]
struct Cli {
    /// Engine configuration YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an endpoint on a JSON request body
    Run {
        /// Endpoint path, e.g. analyze_tf or compensation/design_lead_compensator
        endpoint: String,
        /// Request body file; `-` or omitted reads stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List the available endpoints
    Endpoints,
    /// Time-domain analysis of a transfer function
    Analyze {
        /// Numerator coefficients, highest power first
        #[arg(long, num_args = 1.., allow_negative_numbers = true, required = true)]
        num: Vec<f64>,
        /// Denominator coefficients, highest power first
        #[arg(long, num_args = 1.., allow_negative_numbers = true, required = true)]
        den: Vec<f64>,
    },
    /// Routh-Hurwitz stability range of a characteristic equation
    Routh {
        /// Coefficients, highest power first; numbers or expressions in one variable
        #[arg(required = true, allow_hyphen_values = true)]
        coeffs: Vec<String>,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "request failed");
            let body = err.to_body();
            let text = if cli.pretty {
                serde_json::to_string_pretty(&body)
            } else {
                serde_json::to_string(&body)
            };
            match text {
                Ok(t) => eprintln!("{t}"),
                Err(_) => eprintln!("{err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    match &cli.command {
        Commands::Run { endpoint, input } => {
            let body = read_body(input.as_deref())?;
            print_json(&dispatch(endpoint, body, &config)?, cli.pretty)
        }
        Commands::Endpoints => {
            for e in Endpoint::ALL {
                println!("{e}");
            }
            Ok(())
        }
        Commands::Analyze { num, den } => {
            let body = json!({ "numerator": num, "denominator": den });
            print_json(&dispatch("analyze_tf", body, &config)?, cli.pretty)
        }
        Commands::Routh { coeffs } => {
            let body = json!({ "denominator_coeffs": coeffs });
            print_json(
                &dispatch("analyze_stability_range", body, &config)?,
                cli.pretty,
            )
        }
    }
}

fn read_body(input: Option<&Path>) -> AppResult<Value> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| AppError::InvalidInput(format!("cannot read stdin: {e}")))?;
            buf
        }
    };
    serde_json::from_str(&text)
        .map_err(|e| AppError::InvalidInput(format!("request body is not valid JSON: {e}")))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
