//! trialmatch command-line interface

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use trialmatch::cli::output::{self, OutputFormat};
use trialmatch::cli::{doid, match_cmd, validate};

/// Clinical trial eligibility matching
#[derive(Parser)]
#[command(name = "trialmatch")]
#[command(
    author,
    version,
    about = "Match patients against clinical trial eligibility criteria",
    long_about = None
)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// DOID ontology dump (obo-graph JSON)
    #[arg(long, global = true, env = "TRIALMATCH_DOID")]
    doid: Option<PathBuf>,

    /// DOID manual configuration (JSON)
    #[arg(long, global = true)]
    doid_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a patient against trials
    Match {
        /// Patient record (JSON)
        patient: PathBuf,

        /// Trial files (JSON)
        #[arg(short, long = "trials", required = true)]
        trials: Vec<PathBuf>,

        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long, conflicts_with = "historic")]
        reference_date: Option<NaiveDate>,

        /// Evaluate as of the most recent date in the patient record
        #[arg(long)]
        historic: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the criteria of trial files
    Validate {
        /// Trial files to validate
        files: Vec<PathBuf>,
    },

    /// Show a DOID with its ancestors
    Doid {
        /// DOID or term
        query: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Some(doid_path) = cli.doid else {
        anyhow::bail!("No DOID ontology given (use --doid or TRIALMATCH_DOID)");
    };

    match cli.command {
        Commands::Match {
            patient,
            trials,
            reference_date,
            historic,
            format,
            output,
        } => match_cmd::run(match_cmd::MatchConfig {
            patient,
            trials,
            doid: doid_path,
            doid_config: cli.doid_config,
            reference_date,
            historic,
            format,
            output_file: output,
        }),

        Commands::Validate { files } => validate::validate(validate::ValidateConfig {
            files,
            doid: doid_path,
            doid_config: cli.doid_config,
            verbose: cli.verbose,
        }),

        Commands::Doid { query } => doid::run(doid::DoidConfig {
            doid: doid_path,
            doid_config: cli.doid_config,
            query,
        }),
    }
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
