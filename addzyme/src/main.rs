//! `addzyme` command-line entry point.

use std::path::PathBuf;

use addzyme::pipeline::load_calculator;
use addzyme::{check_roles, AppConfig, EcNumber, PredictionRequest, Predictor, Role};
use addzyme_core::Summarizable;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "addzyme", version)]
#[command(about = "Predict the effect of an additive on enzyme activity", long_about = None)]
struct Cli {
    /// Config TOML file
    #[arg(short, long, global = true, env = "ADDZYME_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check substrate and additive against the applicability domain
    Check {
        #[arg(long)]
        substrate: Option<String>,

        #[arg(long)]
        additive: Option<String>,

        /// Print the reports as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run the ensemble on one substrate/additive pair
    Predict {
        /// Substrate SMILES
        #[arg(long)]
        substrate: String,

        /// Additive SMILES
        #[arg(long)]
        additive: String,

        /// EC number, e.g. 3.1.1.3
        #[arg(long)]
        ec: String,

        /// Temperature in °C (20 to 75, step 5)
        #[arg(long)]
        temperature: f64,

        /// pH (5.0 to 9.0, step 0.5)
        #[arg(long)]
        ph: f64,

        /// Print the full report as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// List the selectable EC numbers
    EcNumbers,
    /// List the active descriptor names in feature order
    Descriptors,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "addzyme=debug" } else { "addzyme=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("loading config {}", path.display()),
        None => "building default config".to_string(),
    })?;

    match cli.command {
        Commands::Check { substrate, additive, json } => {
            if substrate.is_none() && additive.is_none() {
                anyhow::bail!("give --substrate, --additive or both");
            }
            let inputs: Vec<(Role, &str)> = [(Role::Substrate, substrate.as_deref()), (Role::Additive, additive.as_deref())]
                .into_iter()
                .filter_map(|(role, smiles)| smiles.map(|s| (role, s)))
                .collect();
            let checks = check_roles(&inputs, &config.domain, &config.standardize);
            if json {
                println!("{}", serde_json::to_string_pretty(&checks)?);
            } else {
                for c in &checks {
                    println!("{}", c.summary());
                }
            }
            let invalid = checks.iter().filter(|c| !c.is_valid()).count();
            if invalid > 0 {
                anyhow::bail!("{invalid} of {} structures could not be parsed", checks.len());
            }
        }
        Commands::Predict { substrate, additive, ec, temperature, ph, json } => {
            let predictor = Predictor::from_config(&config)
                .with_context(|| format!("loading models from {}", config.models.dir.display()))?;
            let request = PredictionRequest { substrate, additive, ec_number: ec, temperature, ph };
            let report = predictor.run(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in report.lines() {
                    println!("{line}");
                }
            }
        }
        Commands::EcNumbers => {
            for ec in EcNumber::all() {
                println!("{ec}");
            }
        }
        Commands::Descriptors => {
            let calc = load_calculator(&config).context("loading descriptor list")?;
            for name in calc.names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
