//! Measure transfer command-line interface

use clap::{Parser, Subcommand};
use octofhir_qm::cli::{convert, init_logging, output, unit};
use std::path::PathBuf;

/// Measure transfer command-line tool
#[derive(Parser)]
#[command(name = "qm-transfer")]
#[command(author, version, about = "Convert legacy measure exports to the new measure model", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a source measure record (JSON) to a target measure
    Convert {
        /// Source measure record file
        file: PathBuf,

        /// Generate sequential ids instead of random UUIDs
        #[arg(long)]
        deterministic_ids: bool,

        /// Year used for measurement periods the record leaves open
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Look up a unit code in the bundled units table
    Unit {
        /// Unit code, e.g. "mg/dL"
        code: String,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            file,
            deterministic_ids,
            year,
        } => {
            let config = convert::ConvertConfig {
                file,
                pretty: cli.pretty,
                deterministic_ids,
                reference_year: year,
                output_file: cli.output.clone(),
            };
            convert::convert(config).await
        }

        Commands::Unit { code } => {
            let config = unit::UnitConfig {
                code,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            unit::unit(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
