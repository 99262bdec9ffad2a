//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use iemocap_va::config::{MAX_AUDIO_SECS, PROCESSOR_ID, TOKENIZER_ID};
use iemocap_va::split::Split;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "iemocap")]
#[command(about = "IEMOCAP valence/arousal dataset inspection tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show split length and per-category counts
    Stats(crate::stats::Args),

    /// Collate one batch and show its shapes
    Batch(crate::batch::Args),

    /// Show a single sample
    Item(crate::item::Args),
}

/// Where pretrained tokenizer and processor files come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModelSource {
    /// Local directory if it exists, otherwise HuggingFace API
    #[default]
    Auto,
    /// Local directory
    Path,
    /// HuggingFace cache only
    Cache,
    /// HuggingFace API
    Api,
}

/// Dataset selection shared by all subcommands.
#[derive(clap::Args, Debug)]
pub struct DatasetArgs {
    /// Dataset root containing split/ and feature/
    #[arg(long, env = "CLSREG_DATASET")]
    pub root: PathBuf,

    /// Split to load (TRAIN, VALID, TEST or ALL)
    #[arg(short, long, default_value_t = Split::Train)]
    pub split: Split,

    /// Valence-arousal map JSON (default: <root>/split/IEMOCAP/va_map.json)
    ///
    /// The corpus does not ship this file. It is a JSON object from category
    /// name to a `[valence, arousal]` pair, e.g. `{"Happy": [0.8, 0.6]}`, and
    /// must exist at the default location unless this flag points elsewhere.
    #[arg(long)]
    pub va_map: Option<PathBuf>,

    /// Tokenizer model id or directory
    #[arg(long, default_value = TOKENIZER_ID)]
    pub tokenizer: String,

    /// Audio processor model id or directory
    #[arg(long, default_value = PROCESSOR_ID)]
    pub processor: String,

    #[arg(long, value_enum, default_value_t = ModelSource::Auto)]
    pub model_source: ModelSource,

    /// Audio cap in seconds
    #[arg(long, default_value_t = MAX_AUDIO_SECS)]
    pub max_audio_secs: usize,

    /// Text truncation length (default: tokenizer's model_max_length)
    #[arg(long)]
    pub text_max_length: Option<usize>,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Stats(args) => crate::stats::execute(args.try_into()?),
        Commands::Batch(args) => crate::batch::execute(args.try_into()?),
        Commands::Item(args) => crate::item::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_default_dataset_args(args: &DatasetArgs) {
        assert_eq!(args.tokenizer, TOKENIZER_ID);
        assert_eq!(args.processor, PROCESSOR_ID);
        assert_eq!(args.model_source, ModelSource::Auto);
        assert_eq!(args.max_audio_secs, 16);
        assert!(args.va_map.is_none());
        assert!(args.text_max_length.is_none());
    }

    #[test]
    fn parses_stats_command() {
        let cli = Cli::parse_from(["iemocap", "stats", "--root", "/data", "--split", "ALL"]);

        match &cli.command {
            Commands::Stats(crate::stats::Args { dataset })
                if dataset.root.to_str() == Some("/data") && dataset.split == Split::All =>
            {
                assert_default_dataset_args(dataset);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_batch_command() {
        let cli = Cli::parse_from([
            "iemocap",
            "batch",
            "--root",
            "/data",
            "-s",
            "test",
            "-b",
            "4",
            "--index",
            "8",
        ]);

        match &cli.command {
            Commands::Batch(crate::batch::Args {
                dataset,
                batch_size,
                index: 8,
            }) if batch_size.get() == 4 && dataset.split == Split::Test => {
                assert_default_dataset_args(dataset);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_item_command() {
        let cli = Cli::parse_from([
            "iemocap",
            "item",
            "--root",
            "/data",
            "--model-source",
            "cache",
            "12",
        ]);

        match &cli.command {
            Commands::Item(crate::item::Args { dataset, index: 12 }) => {
                assert_eq!(dataset.split, Split::Train);
                assert_eq!(dataset.model_source, ModelSource::Cache);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn rejects_unknown_split() {
        let result = Cli::try_parse_from(["iemocap", "stats", "--root", "/data", "--split", "DEV"]);

        assert!(result.is_err());
    }

    #[test]
    fn help_documents_va_map_requirement() {
        use clap::CommandFactory;

        let mut command = Cli::command();
        let help = command
            .find_subcommand_mut("stats")
            .unwrap()
            .render_long_help()
            .to_string();

        assert!(help.contains("--va-map"));
        assert!(help.contains("split/IEMOCAP/va_map.json"));
        assert!(help.contains("does not ship this file"));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let result = Cli::try_parse_from(["iemocap", "batch", "--root", "/data", "-b", "0"]);

        assert!(result.is_err());
    }
}
