//! Item subcommand - show one sample.

use crate::cli::DatasetArgs;
use crate::config::DatasetSelection;
use eyre::{Result, WrapErr};
use iemocap_va::dataset::IemocapDataset;

/// CLI arguments for sample lookup.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Sample index within the split
    pub index: usize,
}

/// Resolved configuration for sample lookup.
#[derive(Debug)]
pub struct Config {
    pub selection: DatasetSelection,
    pub index: usize,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            selection: args.dataset.try_into()?,
            index: args.index,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let DatasetSelection {
        config: dataset_config,
        split,
    } = config.selection;

    let dataset = IemocapDataset::open(&dataset_config, split)?;
    let sample = dataset
        .get(config.index)
        .wrap_err_with(|| format!("failed to load sample {} of {split}", config.index))?;

    println!("fname: {}", sample.fname);
    println!("va: ({:.3}, {:.3})", sample.va.valence, sample.va.arousal);
    println!("audio shape: {:?}", sample.audio.shape());
    println!("text: {}", sample.text);

    Ok(())
}
