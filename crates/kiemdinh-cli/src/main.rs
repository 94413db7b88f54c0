mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use kiemdinh_core::rules::builtin;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kiemdinh",
    version,
    about = "Contaminant threshold evaluation for vegetable inspections"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which rule table to evaluate against.
#[derive(Args)]
struct RuleSource {
    /// Custom JSON rule file (overrides --preset)
    #[arg(short, long = "rules", value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Predefined rule table
    #[arg(short, long = "preset", value_name = "NAME", default_value = builtin::DEFAULT_PRESET)]
    preset: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate measurements from a JSON request file (one request or an array)
    Evaluate {
        /// Path to JSON file: {"cropType": ..., "measurements": {...}}
        input_file: PathBuf,

        /// Crop type label, overriding the one in the file
        #[arg(short, long)]
        crop: Option<String>,

        #[command(flatten)]
        source: RuleSource,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show all contaminants, not just warnings and exceedances
        #[arg(long)]
        show_all: bool,

        /// Show detailed per-contaminant reasoning
        #[arg(long)]
        verbose: bool,
    },
    /// Evaluate replicate sample counts against a sampling plan
    Samples {
        /// Contaminant key (e.g. "ecoli")
        contaminant: String,

        /// One value per replicate sample
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,

        #[command(flatten)]
        source: RuleSource,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Manage and inspect rule tables
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rule tables
    List,
    /// Explain a rule table in plain language
    Explain {
        /// Preset name (e.g., "rau")
        preset: String,

        /// Only show limits applicable to this crop type
        #[arg(short, long)]
        crop: Option<String>,
    },
    /// Print the JSON schema with field descriptions and example
    Schema,
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
    /// List recognised crop types
    Crops,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            input_file,
            crop,
            source,
            output,
            show_all,
            verbose,
        } => commands::evaluate::run(
            input_file,
            crop,
            source.rules,
            &source.preset,
            &output,
            show_all,
            verbose,
        ),
        Commands::Samples {
            contaminant,
            values,
            source,
            output,
        } => commands::samples::run(&contaminant, &values, source.rules, &source.preset, &output),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset, crop } => commands::rules::explain(&preset, crop.as_deref()),
            RulesAction::Schema => commands::rules::schema(),
            RulesAction::Validate { file } => commands::rules::validate(&file),
            RulesAction::Crops => commands::rules::crops(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
