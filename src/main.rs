pub mod dataset;
pub mod error;
pub mod experiment;
pub mod model;
pub mod plot;

use anyhow::Context;
use clap::Parser;
use dataset::DatasetKind;
use experiment::recorder::LabelEncoding;
use experiment::{ExperimentDriver, ExperimentSettings, Mode};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Experiment mode
    /// `full` samples a new dataset for every run, in a single group
    /// `psa_runs` runs a separate group for each of the given datasets
    #[arg(short, long, default_value = "psa_runs")]
    mode: String,

    /// Number of runs per group
    #[arg(short = 'r', long, default_value_t = 1000)]
    num_runs: usize,

    /// Directory the groups are written to
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Datasets to run, one group each (psa_runs only)
    #[arg(
        short,
        long,
        value_enum,
        num_args = 1..,
        value_delimiter = ' ',
        default_values_t = [DatasetKind::Spiral]
    )]
    datasets: Vec<DatasetKind>,

    /// Noise of the shared datasets, in percent (psa_runs only)
    #[arg(short, long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(0..=50))]
    noise: u32,

    /// Number of points in every dataset
    /// At least 10, so that the smallest training percentage keeps a training sample
    #[arg(
        short = 's',
        long,
        default_value_t = 200,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(10..)
    )]
    num_samples: usize,

    /// Write negative predictions as -1 instead of 0
    #[arg(long)]
    neg_pos_labels: bool,

    /// Seed of the random number generator
    /// If this parameter is not provided, the generator is seeded from the OS
    #[arg(long, default_value = None)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mode: Mode = args.mode.parse()?;
    let settings = ExperimentSettings {
        num_samples: args.num_samples,
        encoding: if args.neg_pos_labels {
            LabelEncoding::NegPos
        } else {
            LabelEncoding::ZeroOne
        },
        ..ExperimentSettings::default()
    };

    let plan = mode.plan(args.datasets, args.noise);
    let mut driver = ExperimentDriver::new(settings, &args.output_dir, args.seed);
    let groups = driver
        .execute_runs(plan.as_ref(), args.num_runs)
        .with_context(|| format!("experiment in {} failed", args.output_dir.display()))?;

    for group in groups {
        info!("wrote {}", group.display());
    }

    Ok(())
}
