//! Configuration types for resolved CLI arguments.
//!
//! This module contains Config structs and their TryFrom implementations.
//! Args structs (for CLI parsing) remain in cli.rs and the subcommand modules.

use crate::cli::{DatasetArgs, ModelSource};
use eyre::Result;
use iemocap_va::config::DatasetConfig;
use iemocap_va::split::Split;
use iemocap_va::types::ModelRepo;
use std::path::PathBuf;

/// Resolved dataset selection.
///
/// Converted from DatasetArgs via TryFrom.
#[derive(Debug)]
pub struct DatasetSelection {
    pub config: DatasetConfig,
    pub split: Split,
}

impl ModelSource {
    /// Build the repository for model `id` from this source.
    pub fn repo(self, id: &str) -> Result<ModelRepo> {
        match self {
            ModelSource::Auto => ModelRepo::auto(id),
            ModelSource::Path => Ok(ModelRepo::Path(PathBuf::from(id))),
            ModelSource::Cache => Ok(ModelRepo::cache(id)),
            ModelSource::Api => ModelRepo::api(id),
        }
    }
}

impl TryFrom<DatasetArgs> for DatasetSelection {
    type Error = eyre::Error;

    fn try_from(args: DatasetArgs) -> Result<Self> {
        let tokenizer = args.model_source.repo(&args.tokenizer)?;
        let processor = args.model_source.repo(&args.processor)?;

        let mut config = DatasetConfig::new(args.root, tokenizer, processor);
        config.va_map = args.va_map;
        config.text_max_length = args.text_max_length;
        config.max_audio_secs = args.max_audio_secs;

        Ok(Self {
            config,
            split: args.split,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn resolves_local_model_dirs() {
        let cli = Cli::parse_from([
            "iemocap",
            "stats",
            "--root",
            "/data",
            "--split",
            "VALID",
            "--model-source",
            "path",
            "--tokenizer",
            "/models/tok",
            "--processor",
            "/models/proc",
            "--va-map",
            "/data/va.json",
            "--max-audio-secs",
            "8",
        ]);

        let Commands::Stats(args) = cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };

        let selection = DatasetSelection::try_from(args.dataset).unwrap();

        assert_eq!(selection.split, Split::Valid);
        assert_eq!(selection.config.max_audio_secs, 8);
        assert_eq!(selection.config.va_map_path(), PathBuf::from("/data/va.json"));
        assert!(matches!(
            selection.config.tokenizer,
            ModelRepo::Path(ref p) if p == &PathBuf::from("/models/tok")
        ));
        assert!(matches!(selection.config.processor, ModelRepo::Path(_)));
    }
}
