//! Stats subcommand - split length and category counts.

use crate::cli::DatasetArgs;
use crate::config::DatasetSelection;
use eyre::{Result, WrapErr};
use iemocap_va::dataset::IemocapDataset;

/// CLI arguments for split statistics.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,
}

/// Resolved configuration for split statistics.
#[derive(Debug)]
pub struct Config {
    pub selection: DatasetSelection,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            selection: args.dataset.try_into()?,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let DatasetSelection { config, split } = config.selection;

    let dataset = IemocapDataset::open(&config, split)?;
    let counts = dataset
        .category_counts()
        .wrap_err("failed to count categories")?;

    println!("split: {split}");
    println!("len: {}", dataset.len());
    println!("max audio len: {}", dataset.max_audio_len());

    for (category, count) in counts {
        println!("  {category}: {count}");
    }

    Ok(())
}
