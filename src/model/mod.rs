use ndarray::ArrayView2;

use crate::dataset::Dataset;

pub mod neural_net;

/// Mean loss over the training and test slices of a dataset
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Losses {
    pub train: f64,
    pub test: f64,
}

pub trait Model {
    /// Advance training by exactly `num_steps` mini-batches and report the losses afterwards.
    /// With `restart` the learned state is thrown away first.
    fn train(&mut self, dataset: &Dataset, restart: bool, num_steps: usize) -> Losses;
    /// Losses of the current state, without training
    fn losses(&self, dataset: &Dataset) -> Losses;
    /// Predict a label in {0, 1} for each row of the full feature matrix
    fn predict_labels(&self, features: &ArrayView2<f64>) -> Vec<u8>;
}
