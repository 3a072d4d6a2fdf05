use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use csat_driver::config::{load_scenario, write_seed_scenario};
use csat_driver::model::{
    compute_weights, parse_deltas, predict_overall, validate_deltas,
};
use csat_driver::output::{self, ReportStyle};

const EXIT_SUCCESS: i32 = 0;
const EXIT_IO: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show usage-adjusted feature weights and intercepts (default if no subcommand)
    Weights,
    /// Predict overall CSAT after hypothetical feature score changes
    Predict {
        /// Feature score change as <customer>.<feature>=<value>, e.g. aws.search=+0.1 or lab.export=-5pp
        #[arg(short, long = "delta", value_name = "ASSIGNMENT")]
        deltas: Vec<String>,
    },
    /// Write the built-in seed scenario as a starting point
    Init {
        /// Where to write the scenario (defaults to ~/.config/csat-driver/scenario.yaml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "csat-driver")]
#[command(about = "Usage-aware CSAT driver weights and what-if prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to scenario file (defaults to ~/.config/csat-driver/scenario.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the scenario's usage emphasis (0 = ignore usage, 1 = linear)
    #[arg(short, long, global = true)]
    alpha: Option<f64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// RUST_LOG wins; otherwise warn, or debug with --verbose.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "csat_driver=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn print_errors(title: &str, errors: &[String]) {
    eprintln!("{}:", title);
    for error in errors {
        eprintln!("  - {}", error);
    }
}

fn run_init(path: Option<PathBuf>, force: bool) -> ! {
    match write_seed_scenario(path, force) {
        Ok(path) => {
            println!("Scenario written to {}", path.display());
            std::process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // None = weights report, Some = what-if prediction
    let delta_args = match cli.command.unwrap_or(Commands::Weights) {
        Commands::Init { path, force } => run_init(path, force),
        Commands::Weights => None,
        Commands::Predict { deltas } => Some(deltas),
    };

    let scenario = match load_scenario(cli.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = scenario.validate(cli.alpha) {
        print_errors("Scenario errors", &errors);
        std::process::exit(EXIT_CONFIG);
    }
    let inputs = scenario.to_inputs(cli.alpha);
    tracing::debug!(alpha = inputs.alpha, "Scenario validated");

    let style = ReportStyle::detect();

    let rendered = match delta_args {
        None => {
            let weights = compute_weights(&inputs);
            if cli.json {
                output::format_json(&weights)
            } else {
                Ok(output::format_weights_report(&weights, inputs.alpha, style))
            }
        }
        Some(args) => {
            let deltas = match parse_deltas(&args) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Delta error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if let Err(errors) = validate_deltas(&deltas) {
                print_errors("Delta errors", &errors);
                std::process::exit(EXIT_CONFIG);
            }

            let prediction = predict_overall(&inputs, Some(&deltas));
            for (customer, outcome) in prediction.result.iter() {
                tracing::debug!(
                    customer = %customer,
                    now = outcome.now,
                    pred = outcome.pred,
                    "Predicted overall"
                );
            }

            if cli.json {
                output::format_json(&prediction)
            } else {
                Ok(output::format_prediction_report(
                    &inputs,
                    Some(&deltas),
                    &prediction,
                    scenario.target(),
                    style,
                ))
            }
        }
    };

    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Output error: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
