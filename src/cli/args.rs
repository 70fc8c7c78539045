use crate::core::BatchConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Replay account and transfer operations through a batching ledger client
#[derive(Parser, Debug)]
#[command(name = "transfer-batcher")]
#[command(about = "Replay transfers through a batching ledger client", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Maximum number of transfers per ledger call
    #[arg(
        long = "batch-size",
        value_name = "N",
        help = "Maximum transfers per ledger call (default: 1024)"
    )]
    pub batch_size: Option<usize>,

    /// Quiet period before a partial batch is flushed
    #[arg(
        long = "batch-delay-ms",
        value_name = "MS",
        help = "Milliseconds without arrivals before a partial batch flushes (default: 30)"
    )]
    pub batch_delay_ms: Option<u64>,

    /// Optional bound on a single ledger call
    #[arg(
        long = "ledger-timeout-ms",
        value_name = "MS",
        help = "Fail a batch if the ledger does not answer within this many milliseconds"
    )]
    pub ledger_timeout_ms: Option<u64>,

    /// Runtime worker threads
    #[arg(
        long = "workers",
        value_name = "N",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level or filter directive; RUST_LOG takes priority"
    )]
    pub log_level: String,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing options use the defaults; zero values fall back to the
    /// defaults with a logged warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        let default = BatchConfig::default();
        let config = BatchConfig::new(
            self.batch_size.unwrap_or(default.max_batch_size),
            self.batch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.max_batch_delay),
        );

        match self.ledger_timeout_ms {
            Some(ms) if ms > 0 => config.with_ledger_timeout(Duration::from_millis(ms)),
            _ => config,
        }
    }

    /// Worker thread count, defaulting to the number of CPU cores
    pub fn worker_threads(&self) -> usize {
        self.workers.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DEFAULT_MAX_BATCH_DELAY, DEFAULT_MAX_BATCH_SIZE};
    use rstest::rstest;

    #[rstest]
    #[case::batch_size(&["program", "--batch-size", "2000", "input.csv"], Some(2000), None)]
    #[case::batch_delay(&["program", "--batch-delay-ms", "8", "input.csv"], None, Some(8))]
    #[case::no_options(&["program", "input.csv"], None, None)]
    #[case::all_options(
        &["program", "--batch-size", "2000", "--batch-delay-ms", "8", "input.csv"],
        Some(2000),
        Some(8)
    )]
    fn test_config_options(
        #[case] args: &[&str],
        #[case] batch_size: Option<usize>,
        #[case] batch_delay_ms: Option<u64>,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.batch_size, batch_size);
        assert_eq!(parsed.batch_delay_ms, batch_delay_ms);
        assert_eq!(parsed.input_file, PathBuf::from("input.csv"));
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_DELAY)]
    #[case::custom_size(&["program", "--batch-size", "8", "input.csv"], 8, DEFAULT_MAX_BATCH_DELAY)]
    #[case::custom_delay(
        &["program", "--batch-delay-ms", "5", "input.csv"],
        DEFAULT_MAX_BATCH_SIZE,
        Duration::from_millis(5)
    )]
    #[case::zero_size(&["program", "--batch-size", "0", "input.csv"], DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_DELAY)]
    #[case::zero_delay(&["program", "--batch-delay-ms", "0", "input.csv"], DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_DELAY)]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_size: usize,
        #[case] expected_delay: Duration,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.max_batch_size, expected_size);
        assert_eq!(config.max_batch_delay, expected_delay);
        assert_eq!(config.ledger_timeout, None);
    }

    #[rstest]
    #[case::set(&["program", "--ledger-timeout-ms", "250", "input.csv"], Some(Duration::from_millis(250)))]
    #[case::zero_disables(&["program", "--ledger-timeout-ms", "0", "input.csv"], None)]
    fn test_ledger_timeout(#[case] args: &[&str], #[case] expected: Option<Duration>) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();
        assert_eq!(config.ledger_timeout, expected);
    }

    #[rstest]
    #[case::default(&["program", "input.csv"], num_cpus::get())]
    #[case::explicit(&["program", "--workers", "3", "input.csv"], 3)]
    #[case::zero(&["program", "--workers", "0", "input.csv"], num_cpus::get())]
    fn test_worker_threads(#[case] args: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.worker_threads(), expected);
    }

    #[test]
    fn test_log_level_default() {
        let parsed = CliArgs::try_parse_from(["program", "input.csv"]).unwrap();
        assert_eq!(parsed.log_level, "warn");
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::negative_batch_size(&["program", "--batch-size", "-1", "input.csv"])]
    #[case::non_numeric_delay(&["program", "--batch-delay-ms", "soon", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
