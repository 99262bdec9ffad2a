//! Integration tests for iemocap CLI.

use clap::Parser;
use iemocap_cli::cli::{Cli, run_cli};

#[test]
#[ignore = "CLSREG_DATASET corpus and model download required"]
fn stats_reads_full_corpus() {
    let cli = Cli::parse_from(["iemocap", "stats", "--split", "ALL"]);

    run_cli(cli).expect("failed to read split statistics");
}

#[test]
#[ignore = "CLSREG_DATASET corpus and model download required"]
fn batch_collates_first_test_batch() {
    let cli = Cli::parse_from(["iemocap", "batch", "--split", "TEST", "-b", "2"]);

    run_cli(cli).expect("failed to collate batch");
}
