//! Rust Transfer Batcher CLI
//!
//! Replays account and transfer operations from a CSV file through the
//! batching engine and prints the final balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --batch-size 256 --batch-delay-ms 10 operations.csv > balances.csv
//! RUST_LOG=debug cargo run -- operations.csv > balances.csv
//! ```
//!
//! Balances go to stdout; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use rust_transfer_batcher::cli;
use rust_transfer_batcher::logging;
use rust_transfer_batcher::pipeline::FilePipeline;
use std::process;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();

    logging::init_logging(&args.log_level);

    let pipeline = FilePipeline::new(args.to_batch_config(), args.worker_threads());

    // Output goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = pipeline.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
