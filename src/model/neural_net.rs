use crate::dataset::Dataset;
use crate::experiment::sampler::RunConfig;
use ndarray::{Array, Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Losses, Model};

// Probabilities are kept this far from 0 and 1 when taking logs
const EPSILON: f64 = 1e-7;

/// A feed-forward binary classifier with a single sigmoid output unit
pub struct NeuralNet {
    pub layers: Vec<(Array2<f64>, Array1<f64>)>, // Each layer holds a weight matrix and a bias vector
    pub features_ids: Vec<usize>,                // Columns of the full feature matrix fed to the input layer
    pub perc_train: u32,                         // Training hyperparams
    pub batch_size: usize,
    pub learning_rate: f64,
    pub activation_function: ActivationFunction,
    pub regularization: Regularization,
    pub regularization_rate: f64,
    layer_structure: Vec<usize>,
    step: usize,
    cursor: usize,
    rng: StdRng,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationFunction {
    ReLU,
    Tanh,
    Sigmoid,
    Linear,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 4] = [
        ActivationFunction::ReLU,
        ActivationFunction::Tanh,
        ActivationFunction::Sigmoid,
        ActivationFunction::Linear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Linear => "linear",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regularization {
    None,
    L1,
    L2,
}

impl Regularization {
    pub const ALL: [Regularization; 3] = [Regularization::None, Regularization::L1, Regularization::L2];

    pub fn name(&self) -> &'static str {
        match self {
            Regularization::None => "none",
            Regularization::L1 => "L1",
            Regularization::L2 => "L2",
        }
    }
}

impl NeuralNet {
    /// Construct the network for a sampled configuration.
    /// The layer structure is [#features, hidden..., 1].
    pub fn build<R: Rng + ?Sized>(config: &RunConfig, rng: &mut R) -> NeuralNet {
        let mut layer_structure = vec![config.features_ids.len()];
        layer_structure.extend(&config.neurons_per_layer);
        layer_structure.push(1);

        let mut rng = StdRng::seed_from_u64(rng.gen());
        let layers = init_layers_xavier(&layer_structure, &mut rng);

        NeuralNet {
            layers,
            features_ids: config.features_ids.clone(),
            perc_train: config.perc_train,
            batch_size: config.batch_size.max(1),
            learning_rate: config.learning_rate,
            activation_function: config.activation,
            regularization: config.regularization,
            regularization_rate: config.regularization_rate,
            layer_structure,
            step: 0,
            cursor: 0,
            rng,
        }
    }

    /// Number of mini-batch steps taken since the last restart
    pub fn step(&self) -> usize {
        self.step
    }

    // Perform a forward pass of the network on the selected input features.
    // Returns the outputs of every layer, and the non-activated outputs of the layers (used for backprop)
    fn forward(&self, inputs: &ArrayView2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut hidden = vec![inputs.to_owned()];
        let mut hidden_linear = vec![];

        let mut it = self.layers.iter().peekable();

        while let Some(layer) = it.next() {
            let lin_output = hidden[hidden.len() - 1].dot(&layer.0) + &layer.1;
            // Hidden layers use the configured activation, the output unit is a sigmoid
            let real_output = match it.peek() {
                Some(_) => lin_output.map(|x| activation(&self.activation_function, *x)),
                None => lin_output.map(|x| sigmoid(*x)),
            };

            hidden.push(real_output);
            hidden_linear.push(lin_output);
        }

        (hidden, hidden_linear)
    }

    /// Calculate the gradients using backprop and perform a GD step
    fn backward_and_update(
        &mut self,
        hidden: Vec<Array2<f64>>,
        hidden_linear: Vec<Array2<f64>>,
        grad: Array2<f64>,
    ) {
        // The gradient WRT the current layer
        let mut grad_help = grad;

        for idx in (0..self.layers.len()).rev() {
            // The output layer gradient already accounts for the sigmoid
            if idx != self.layers.len() - 1 {
                let step_mat =
                    hidden_linear[idx].map(|x| delta_activation(&self.activation_function, *x));
                grad_help = grad_help * step_mat;
            }

            let weights = &self.layers[idx].0;
            let penalty = weights.map(|w| delta_regularization(&self.regularization, *w));
            let weight_grad = hidden[idx].t().dot(&grad_help) + self.regularization_rate * penalty;
            let bias_grad = grad_help.sum_axis(Axis(0));

            let new_weights = weights - self.learning_rate * weight_grad;
            let new_biases = &self.layers[idx].1 - self.learning_rate * bias_grad;

            grad_help = grad_help.dot(&weights.t());

            self.layers[idx] = (new_weights, new_biases);
        }
    }

    /// Output probabilities for rows of the full feature matrix
    fn probabilities(&self, features: &ArrayView2<f64>) -> Array1<f64> {
        let inputs = features.select(Axis(1), &self.features_ids);
        let (mut hidden, _) = self.forward(&inputs.view());

        hidden.pop().map(|out| out.column(0).to_owned()).unwrap_or_default()
    }

    fn restart(&mut self) {
        self.layers = init_layers_xavier(&self.layer_structure, &mut self.rng);
        self.step = 0;
        self.cursor = 0;
    }
}

impl Model for NeuralNet {
    /// Take `num_steps` batches from the training slice, resuming where the last call stopped
    fn train(&mut self, dataset: &Dataset, restart: bool, num_steps: usize) -> Losses {
        if restart {
            self.restart();
        }

        let num_training = dataset.num_training(self.perc_train);
        if num_training > 0 {
            for _ in 0..num_steps {
                let indices: Vec<usize> = (0..self.batch_size)
                    .map(|k| (self.cursor + k) % num_training)
                    .collect();
                self.cursor = (self.cursor + self.batch_size) % num_training;

                let input_batch = dataset
                    .features
                    .select(Axis(0), &indices)
                    .select(Axis(1), &self.features_ids);
                let target_batch: Array2<f64> =
                    Array::from_shape_fn((indices.len(), 1), |(row, _)| {
                        dataset.labels[indices[row]] as f64
                    });

                let (hidden, hidden_linear) = self.forward(&input_batch.view());
                // Gradient of the mean cross-entropy WRT the pre-sigmoid output
                let grad = (&hidden[hidden.len() - 1] - &target_batch) / indices.len() as f64;

                self.backward_and_update(hidden, hidden_linear, grad);
                self.step += 1;
            }
        }

        self.losses(dataset)
    }

    fn losses(&self, dataset: &Dataset) -> Losses {
        let num_training = dataset.num_training(self.perc_train);
        let probabilities = self.probabilities(&dataset.features.view());
        let probabilities = probabilities.as_slice().unwrap_or(&[]);
        let (train_probs, test_probs) = probabilities.split_at(num_training);
        let (train_labels, test_labels) = dataset.labels.split_at(num_training);

        Losses {
            train: cross_entropy(train_probs, train_labels),
            test: cross_entropy(test_probs, test_labels),
        }
    }

    fn predict_labels(&self, features: &ArrayView2<f64>) -> Vec<u8> {
        self.probabilities(features)
            .iter()
            .map(|p| (*p >= 0.5) as u8)
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    (1f64 + (-z).exp()).recip()
}

fn activation(name: &ActivationFunction, z: f64) -> f64 {
    match name {
        ActivationFunction::ReLU => z.max(0f64),
        ActivationFunction::Tanh => z.tanh(),
        ActivationFunction::Sigmoid => sigmoid(z),
        ActivationFunction::Linear => z,
    }
}

fn delta_activation(name: &ActivationFunction, z: f64) -> f64 {
    match name {
        ActivationFunction::ReLU => if z > 0f64 {1f64} else {0f64},
        ActivationFunction::Tanh => 1f64 - z.tanh() * z.tanh(),
        ActivationFunction::Sigmoid => sigmoid(z) * (1f64 - sigmoid(z)),
        ActivationFunction::Linear => 1f64,
    }
}

fn delta_regularization(name: &Regularization, w: f64) -> f64 {
    match name {
        Regularization::None => 0f64,
        Regularization::L1 => if w > 0f64 {1f64} else if w < 0f64 {-1f64} else {0f64},
        Regularization::L2 => w,
    }
}

fn init_layers_xavier<R: Rng + ?Sized>(
    layer_structure: &[usize],
    rng: &mut R,
) -> Vec<(Array2<f64>, Array1<f64>)> {
    let mut layers = vec![];

    for i in 0..layer_structure.len() - 1 {
        let boundary = (6f64 / (layer_structure[i] + layer_structure[i + 1]) as f64).sqrt();
        let dist = Uniform::new_inclusive(-boundary, boundary);

        let weights = Array::zeros((layer_structure[i], layer_structure[i + 1]))
            .map(|_: &f64| dist.sample(rng));
        let bias = Array::zeros(layer_structure[i + 1]);

        layers.push((weights, bias));
    }

    layers
}

/// Mean binary cross-entropy; an empty slice has zero loss
fn cross_entropy(probabilities: &[f64], labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0f64;
    }

    let total: f64 = probabilities
        .iter()
        .zip(labels)
        .map(|(p, label)| {
            let p = p.clamp(EPSILON, 1f64 - EPSILON);
            if *label == 1 {
                p.ln()
            } else {
                (1f64 - p).ln()
            }
        })
        .sum();

    -total / labels.len() as f64
}
