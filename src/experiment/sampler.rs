//! Uniform random sampling of run configurations from a fixed search space.

use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;

use crate::dataset::{features, Dataset, DatasetKind};
use crate::model::neural_net::{ActivationFunction, Regularization};

/// The discrete domains every run configuration is drawn from.
/// Every domain must be non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSpace {
    pub datasets: Vec<DatasetKind>,
    /// Noise percentages
    pub noise_levels: Vec<u32>,
    /// Percentage of the samples used for training
    pub train_percentages: Vec<u32>,
    pub batch_sizes: RangeInclusive<usize>,
    pub learning_rates: Vec<f64>,
    pub hidden_layers: RangeInclusive<usize>,
    pub hidden_neurons: RangeInclusive<usize>,
    pub activations: Vec<ActivationFunction>,
    pub regularizations: Vec<Regularization>,
    pub regularization_rates: Vec<f64>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        SearchSpace {
            datasets: DatasetKind::ALL.to_vec(),
            noise_levels: (0..=50).step_by(5).collect(),
            train_percentages: (10..=90).step_by(10).collect(),
            batch_sizes: 1..=30,
            learning_rates: vec![
                0.00001, 0.0001, 0.001, 0.003, 0.01, 0.03, 0.1, 0.3, 1.0, 3.0, 10.0,
            ],
            hidden_layers: 0..=6,
            hidden_neurons: 1..=8,
            activations: ActivationFunction::ALL.to_vec(),
            regularizations: Regularization::ALL.to_vec(),
            regularization_rates: vec![0.001, 0.003, 0.01, 0.03, 0.1, 0.3, 1.0, 3.0, 10.0],
        }
    }
}

impl SearchSpace {
    /// Width of the padded per-layer neuron columns
    pub fn max_hidden_layers(&self) -> usize {
        *self.hidden_layers.end()
    }

    /// Describe the domains, for the `searchSpace.json` dump
    pub fn to_json(&self) -> json::JsonValue {
        let names = |values: Vec<&str>| -> Vec<String> {
            values.into_iter().map(String::from).collect()
        };

        json::object! {
            datasets: names(self.datasets.iter().map(|d| d.name()).collect()),
            noise_levels: self.noise_levels.clone(),
            train_percentages: self.train_percentages.clone(),
            batch_size: json::array![*self.batch_sizes.start(), *self.batch_sizes.end()],
            learning_rates: self.learning_rates.clone(),
            hidden_layers: json::array![*self.hidden_layers.start(), *self.hidden_layers.end()],
            hidden_neurons: json::array![*self.hidden_neurons.start(), *self.hidden_neurons.end()],
            activations: names(self.activations.iter().map(|a| a.name()).collect()),
            regularizations: names(self.regularizations.iter().map(|r| r.name()).collect()),
            regularization_rates: self.regularization_rates.clone(),
            features: names(features::FEATURE_NAMES.to_vec())
        }
    }
}

/// Everything that varies between runs. Fixed once sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub dataset: DatasetKind,
    pub noise: u32,
    pub perc_train: u32,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub neurons_per_layer: Vec<usize>,
    pub activation: ActivationFunction,
    pub regularization: Regularization,
    pub regularization_rate: f64,
    /// Ascending, non-empty subset of the feature ids
    pub features_ids: Vec<usize>,
}

pub struct ParameterSampler<'a> {
    space: &'a SearchSpace,
}

fn pick<T: Copy, R: Rng + ?Sized>(values: &[T], rng: &mut R) -> T {
    values[rng.gen_range(0..values.len())]
}

impl<'a> ParameterSampler<'a> {
    pub fn new(space: &'a SearchSpace) -> Self {
        ParameterSampler { space }
    }

    /// Draw a full configuration, dataset identity included
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RunConfig {
        let dataset = pick(&self.space.datasets, rng);
        let noise = pick(&self.space.noise_levels, rng);

        self.sample_training(dataset, noise, rng)
    }

    /// Draw the training parameters for an existing dataset
    pub fn sample_for<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> RunConfig {
        self.sample_training(dataset.kind, dataset.noise, rng)
    }

    fn sample_training<R: Rng + ?Sized>(
        &self,
        dataset: DatasetKind,
        noise: u32,
        rng: &mut R,
    ) -> RunConfig {
        let space = self.space;
        let perc_train = pick(&space.train_percentages, rng);
        let batch_size = rng.gen_range(space.batch_sizes.clone());
        let learning_rate = pick(&space.learning_rates, rng);

        let num_layers = rng.gen_range(space.hidden_layers.clone());
        let neurons_per_layer = (0..num_layers)
            .map(|_| rng.gen_range(space.hidden_neurons.clone()))
            .collect();

        let activation = pick(&space.activations, rng);
        let regularization = pick(&space.regularizations, rng);
        let regularization_rate = pick(&space.regularization_rates, rng);

        let mut features_ids = features::all_features();
        features_ids.shuffle(rng);
        features_ids.truncate(rng.gen_range(1..=features::NUM_FEATURES));
        features_ids.sort_unstable();

        RunConfig {
            dataset,
            noise,
            perc_train,
            batch_size,
            learning_rate,
            neurons_per_layer,
            activation,
            regularization,
            regularization_rate,
            features_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn sampled_configs_stay_in_their_domains(seed in any::<u64>()) {
            let space = SearchSpace::default();
            let config = ParameterSampler::new(&space).sample(&mut StdRng::seed_from_u64(seed));

            prop_assert!(!config.features_ids.is_empty());
            prop_assert!(config.features_ids.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(config.features_ids.iter().all(|f| *f < features::NUM_FEATURES));

            prop_assert!(config.neurons_per_layer.len() <= space.max_hidden_layers());
            prop_assert!(config.neurons_per_layer.iter().all(|n| (1..=8).contains(n)));

            prop_assert!((1..=30).contains(&config.batch_size));
            prop_assert!(config.noise <= 50 && config.noise % 5 == 0);
            prop_assert!((10..=90).contains(&config.perc_train) && config.perc_train % 10 == 0);
            prop_assert!(space.learning_rates.contains(&config.learning_rate));
            prop_assert!(space.regularization_rates.contains(&config.regularization_rate));
        }
    }

    #[test]
    fn default_domains_match_the_documented_ranges() {
        let space = SearchSpace::default();

        assert_eq!(space.noise_levels.len(), 11);
        assert_eq!(space.train_percentages, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(space.max_hidden_layers(), 6);
    }

    #[test]
    fn existing_dataset_keeps_its_identity() {
        let space = SearchSpace::default();
        let mut rng = StdRng::seed_from_u64(8);
        let data = Dataset::generate(DatasetKind::Spiral, 50, 25, &mut rng);

        for _ in 0..20 {
            let config = ParameterSampler::new(&space).sample_for(&data, &mut rng);
            assert_eq!(config.dataset, DatasetKind::Spiral);
            assert_eq!(config.noise, 25);
        }
    }

    #[test]
    fn explores_every_layer_count() {
        let space = SearchSpace::default();
        let sampler = ParameterSampler::new(&space);
        let mut rng = StdRng::seed_from_u64(21);

        let mut seen = [false; 7];
        for _ in 0..500 {
            seen[sampler.sample(&mut rng).neurons_per_layer.len()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn search_space_dump_lists_domains() {
        let dump = SearchSpace::default().to_json();

        assert_eq!(dump["batch_size"][1], 30);
        assert_eq!(dump["datasets"].len(), 4);
        assert_eq!(dump["features"][4], "X1X2");
    }
}
