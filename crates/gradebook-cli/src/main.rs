//! gradebook CLI: grades rubric-based student projects from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gradebook",
    version,
    about = "Rubric-based student grading on the Swiss 1-6 scale"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade every student of one or more projects
    Grade {
        /// Path to a .toml project file or directory
        #[arg(long)]
        project: PathBuf,

        /// Rate of points that earns grade 4 (0-1)
        #[arg(long)]
        threshold: Option<f64>,

        /// Correction added to every grade before clamping
        #[arg(long, allow_hyphen_values = true)]
        correction: Option<f64>,

        /// Number of questions a student must answer
        #[arg(long)]
        max_questions: Option<u32>,

        /// Scoring mode: weighted, raw-points
        #[arg(long)]
        scoring_mode: Option<String>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, csv, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two grade reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Grade difference below which a student counts as unchanged
        #[arg(long, default_value = "0.05")]
        tolerance: f64,

        /// Exit code 1 if any grade went down
        #[arg(long)]
        fail_on_lowered: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate project TOML files
    Validate {
        /// Path to a project file or directory
        #[arg(long)]
        project: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example project
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradebook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            project,
            threshold,
            correction,
            max_questions,
            scoring_mode,
            output,
            format,
            config,
        } => commands::grade::execute(commands::grade::GradeArgs {
            project,
            threshold,
            correction,
            max_questions,
            scoring_mode,
            output,
            format,
            config,
        }),
        Commands::Compare {
            baseline,
            current,
            tolerance,
            fail_on_lowered,
            format,
        } => commands::compare::execute(baseline, current, tolerance, fail_on_lowered, format),
        Commands::Validate { project, config } => commands::validate::execute(project, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
