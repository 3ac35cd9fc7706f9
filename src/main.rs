//! Block-Forge CLI
//!
//! Batch block building: read mempool records, validate, assemble, mine,
//! and write the result artifact.

use block_forge::cli::{cmd_run, cmd_validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "blockforge")]
#[command(version = "0.1.0")]
#[command(about = "Build and mine a block from a directory of mempool records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: validate, assemble, mine, write the artifact
    Run {
        /// Directory of transaction record files
        #[arg(short, long, default_value = "mempool")]
        mempool_dir: PathBuf,

        /// Path of the result artifact
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Optional cap on proof-of-work attempts; exhaustion is reported,
        /// not an error
        #[arg(long)]
        max_attempts: Option<u64>,
    },

    /// Validate the records and report, without assembling or mining
    Validate {
        /// Directory of transaction record files
        #[arg(short, long, default_value = "mempool")]
        mempool_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            mempool_dir,
            output,
            max_attempts,
        } => cmd_run(&mempool_dir, &output, max_attempts),
        Commands::Validate { mempool_dir } => cmd_validate(&mempool_dir),
    };

    if let Err(err) = result {
        eprintln!("❌ Error: {}", err);
        process::exit(1);
    }
}
