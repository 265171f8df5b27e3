use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use crate::dataset::{Dataset, DatasetKind};
use crate::error::{Error, Result};
use crate::model::neural_net::NeuralNet;
use crate::model::Model;
use crate::plot::{self, PlotSettings};
use recorder::{LabelEncoding, RunRecorder};
use sampler::{ParameterSampler, RunConfig, SearchSpace};
use schema::CheckpointRecord;

pub mod metrics;
pub mod recorder;
pub mod sampler;
pub mod schedule;
pub mod schema;

/// How datasets are assigned to the runs of a group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One group; every run draws its own dataset
    Full,
    /// One group per declared dataset, shared by all runs of that group
    PsaRuns,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Mode> {
        match s {
            "full" => Ok(Mode::Full),
            "psa_runs" => Ok(Mode::PsaRuns),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl Mode {
    pub fn plan(self, datasets: Vec<DatasetKind>, noise: u32) -> Box<dyn GroupPlan> {
        match self {
            Mode::Full => Box::new(PerRunDataset),
            Mode::PsaRuns => Box::new(SharedDataset { datasets, noise }),
        }
    }
}

pub enum DatasetSource {
    Shared(Dataset),
    PerRun,
}

pub trait GroupPlan {
    fn iteration_count(&self) -> usize;
    /// Name of the group directory, relative to the output directory
    fn dir_name(&self, iteration: usize) -> String;
    fn dataset_for(
        &self,
        iteration: usize,
        num_samples: usize,
        rng: &mut dyn RngCore,
    ) -> DatasetSource;
}

/// Every run of the single group samples a brand-new dataset
pub struct PerRunDataset;

impl GroupPlan for PerRunDataset {
    fn iteration_count(&self) -> usize {
        1
    }

    fn dir_name(&self, _: usize) -> String {
        "full".to_string()
    }

    fn dataset_for(&self, _: usize, _: usize, _: &mut dyn RngCore) -> DatasetSource {
        DatasetSource::PerRun
    }
}

/// One group per declared dataset, all generated at the same noise level
pub struct SharedDataset {
    pub datasets: Vec<DatasetKind>,
    pub noise: u32,
}

impl GroupPlan for SharedDataset {
    fn iteration_count(&self) -> usize {
        self.datasets.len()
    }

    fn dir_name(&self, iteration: usize) -> String {
        format!("{}_{}", self.datasets[iteration], self.noise)
    }

    fn dataset_for(
        &self,
        iteration: usize,
        num_samples: usize,
        rng: &mut dyn RngCore,
    ) -> DatasetSource {
        let kind = self.datasets[iteration];
        DatasetSource::Shared(Dataset::generate(kind, num_samples, self.noise, rng))
    }
}

pub struct ExperimentSettings {
    pub space: SearchSpace,
    pub num_samples: usize,
    /// Ascending epochs at which each run is recorded
    pub epochs: Vec<usize>,
    pub encoding: LabelEncoding,
    pub plot: PlotSettings,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        ExperimentSettings {
            space: SearchSpace::default(),
            num_samples: 200,
            epochs: schedule::CHECKPOINT_EPOCHS.to_vec(),
            encoding: LabelEncoding::default(),
            plot: PlotSettings::default(),
        }
    }
}

/// Trains randomly configured classifiers and records every checkpoint of every run
pub struct ExperimentDriver {
    settings: ExperimentSettings,
    output_dir: PathBuf,
    rng: StdRng,
}

impl ExperimentDriver {
    pub fn new(settings: ExperimentSettings, output_dir: &Path, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        ExperimentDriver {
            settings,
            output_dir: output_dir.to_path_buf(),
            rng,
        }
    }

    /// Execute `num_runs` runs for every group of the plan.
    /// Returns the group directories that were written.
    pub fn execute_runs(&mut self, plan: &dyn GroupPlan, num_runs: usize) -> Result<Vec<PathBuf>> {
        (0..plan.iteration_count())
            .map(|iteration| self.execute_group(plan, iteration, num_runs))
            .collect()
    }

    fn execute_group(
        &mut self,
        plan: &dyn GroupPlan,
        iteration: usize,
        num_runs: usize,
    ) -> Result<PathBuf> {
        let group_dir = self.output_dir.join(plan.dir_name(iteration));
        info!("starting group {}", group_dir.display());
        recorder::create_dir(&group_dir, true)?;

        let source = plan.dataset_for(iteration, self.settings.num_samples, &mut self.rng);
        if let DatasetSource::Shared(data) = &source {
            data.save_to_file(&group_dir.join(recorder::INPUT_FILE))?;
        }

        let columns = schema::index_columns(&self.settings.space);
        let mut recorder =
            RunRecorder::create(&group_dir, &columns, &self.settings.space, self.settings.encoding)?;
        let config_columns = schema::config_columns(&self.settings.space);

        let mut row_index = 0;
        for run_index in 0..num_runs {
            let sampler = ParameterSampler::new(&self.settings.space);
            let (config, dataset) = match &source {
                DatasetSource::Shared(data) => {
                    (sampler.sample_for(data, &mut self.rng), Cow::Borrowed(data))
                }
                DatasetSource::PerRun => {
                    let config = sampler.sample(&mut self.rng);
                    let data = Dataset::generate(
                        config.dataset,
                        self.settings.num_samples,
                        config.noise,
                        &mut self.rng,
                    );
                    (config, Cow::Owned(data))
                }
            };

            info!("({} of {})", run_index, num_runs);
            let params = config_columns
                .iter()
                .zip(schema::config_values(&config, &self.settings.space))
                .map(|(column, value)| format!("{}: {}", column.name, value))
                .collect::<Vec<_>>();
            info!("{}", params.join(", "));

            let mut model = NeuralNet::build(&config, &mut self.rng);
            self.execute_checkpoints(&mut model, &config, &dataset, &mut recorder, &mut row_index)?;
            debug!("run {} finished after {} steps", run_index, model.step());
        }

        Ok(group_dir)
    }

    /// Train one run through the checkpoint schedule, recording a row per checkpoint
    fn execute_checkpoints<M: Model>(
        &self,
        model: &mut M,
        config: &RunConfig,
        dataset: &Dataset,
        recorder: &mut RunRecorder,
        row_index: &mut usize,
    ) -> Result<()> {
        let num_training = dataset.num_training(config.perc_train);
        let mut total_time = 0f64;

        let schedule =
            schedule::checkpoints(&self.settings.epochs, dataset.sample_count(), config.batch_size);

        for checkpoint in schedule {
            let losses = if checkpoint.delta > 0 {
                let time_start = Instant::now();
                let losses = model.train(dataset, false, checkpoint.delta);
                total_time += time_start.elapsed().as_secs_f64() * 1000.0;
                losses
            } else {
                debug!("epoch {} adds no steps, skipping training", checkpoint.epoch);
                model.losses(dataset)
            };
            let mean_time = total_time / checkpoint.epoch.max(1) as f64;

            if !losses.train.is_finite() || !losses.test.is_finite() {
                warn!("non-finite loss at epoch {} (row {})", checkpoint.epoch, row_index);
            }

            let predictions = model.predict_labels(&dataset.features.view());
            let (train, test) = metrics::split_rates(&dataset.labels, &predictions, num_training);

            info!(
                "(epoch: {}, step: {}), (total_time: {}, mean_time: {}), \
                 (training loss: {}, test loss: {}), \
                 (train_tpr: {}, train_fpr: {} test_tpr: {}, test_fpr: {})",
                checkpoint.epoch,
                checkpoint.step,
                total_time,
                mean_time,
                losses.train,
                losses.test,
                train.tpr,
                train.fpr,
                test.tpr,
                test.fpr
            );

            let record = CheckpointRecord {
                row_index: *row_index,
                image_path: RunRecorder::image_name(*row_index),
                config,
                epoch: checkpoint.epoch,
                step: checkpoint.step,
                total_time,
                mean_time,
                losses,
                train,
                test,
            };
            recorder.record(&record, &self.settings.space, &predictions)?;
            plot::render_decision_boundary(
                model,
                dataset,
                num_training,
                &recorder.image_path(*row_index),
                &self.settings.plot,
            )?;

            *row_index += 1;
        }

        Ok(())
    }
}
