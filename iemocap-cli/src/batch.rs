//! Batch subcommand - collate one batch and report shapes.

use crate::cli::DatasetArgs;
use crate::config::DatasetSelection;
use eyre::{Result, WrapErr, ensure};
use iemocap_va::dataset::IemocapDataset;
use std::num::NonZeroUsize;
use std::time::Instant;

/// CLI arguments for batch collation.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Number of samples per batch
    #[arg(short, long, default_value = "8")]
    pub batch_size: NonZeroUsize,

    /// Index of the first sample in the batch
    #[arg(short, long, default_value_t = 0)]
    pub index: usize,
}

/// Resolved configuration for batch collation.
#[derive(Debug)]
pub struct Config {
    pub selection: DatasetSelection,
    pub batch_size: NonZeroUsize,
    pub index: usize,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            selection: args.dataset.try_into()?,
            batch_size: args.batch_size,
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

    ensure!(
        config.index < dataset.len(),
        "index {} out of bounds for {split} (len {})",
        config.index,
        dataset.len()
    );

    let end = (config.index + config.batch_size.get()).min(dataset.len());

    let s = Instant::now();

    let samples = (config.index..end)
        .map(|i| dataset.get(i))
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("failed to load samples")?;
    let batch = dataset.collate(&samples).wrap_err("failed to collate batch")?;

    let d = s.elapsed();
    tracing::info!(duration = %format_secs(d.as_secs_f32()), size = batch.len(), "batch collated");

    println!("audios: {:?}", batch.audios.dim());
    println!("audio_mask: {:?}", batch.audio_mask.dim());
    println!("token: {:?}", batch.token.dim());
    println!("token_mask: {:?}", batch.token_mask.dim());
    println!("va: {:?}", batch.va.dim());
    println!("fnames: {:?}", batch.fnames);

    Ok(())
}

/// Format seconds as a string with two decimal places.
fn format_secs(secs: f32) -> String {
    format!("{:.2}s", secs)
}
