//! Column descriptions for `paramInfo.txt` and the matching flattening of
//! configurations and checkpoints into `index.txt` rows.

use serde::Serialize;

use super::metrics::Rates;
use super::sampler::{RunConfig, SearchSpace};
use crate::dataset::features::{FEATURE_NAMES, NUM_FEATURES};
use crate::model::Losses;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParamType {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "string")]
    Str,
    /// Computed by the run rather than configured
    #[serde(rename = "output")]
    Output,
}

/// One line of `paramInfo.txt`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub info: String,
}

impl ParamInfo {
    fn new(name: &str, label: &str, kind: ParamType, info: &str) -> Self {
        ParamInfo {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            info: info.to_string(),
        }
    }
}

/// Columns describing a run configuration
pub fn config_columns(space: &SearchSpace) -> Vec<ParamInfo> {
    use ParamType::*;

    let mut columns = vec![
        ParamInfo::new("data", "Data", Str, "Which dataset do you want to use?"),
        ParamInfo::new("noise", "Noise", Int, "Noise"),
        ParamInfo::new("training_ratio", "Training Ratio", Int, "Ratio of training to test data"),
        ParamInfo::new("batch_size", "Batch Size", Int, "Batch Size"),
    ];
    columns.extend(FEATURE_NAMES.iter().map(|f| ParamInfo::new(f, f, Int, f)));
    columns.push(ParamInfo::new("layer_count", "Layers Count", Int, "Number of hidden layers"));
    columns.push(ParamInfo::new(
        "neuron_count",
        "Neurons Count",
        Int,
        "Total number of neurons in all hidden layers",
    ));
    columns.extend((1..=space.max_hidden_layers()).map(|i| {
        let name = format!("H{i}");
        ParamInfo::new(&name, &name, Int, &name)
    }));
    columns.extend([
        ParamInfo::new("learning_rate", "Learning rate", Double, "Learning rate"),
        ParamInfo::new("activation", "Activation", Str, "Activation"),
        ParamInfo::new("regularization", "Regularization", Str, "Regularization"),
        ParamInfo::new("regularization_rate", "Regularization rate", Double, "Regularization rate"),
    ]);

    columns
}

/// Every column of `index.txt`, in order
pub fn index_columns(space: &SearchSpace) -> Vec<ParamInfo> {
    use ParamType::*;

    let mut columns = vec![
        ParamInfo::new("ID", "ID", Output, "ID"),
        ParamInfo::new("imagePath", "Image path", Output, "Output image path"),
    ];
    columns.extend(config_columns(space));
    columns.extend([
        ParamInfo::new("epoch", "Epoch", Int, "Number of Epochs (of processing all training data)"),
        ParamInfo::new("iteration", "Iterations", Int, "Number of Iterations (of processing a batch)"),
        ParamInfo::new("total_time", "Total time (ms)", Output, "Total time at this epoch"),
        ParamInfo::new("mean_time", "Mean time (ms)", Output, "Mean time per epoch"),
        ParamInfo::new("train_loss", "Training loss", Output, "Training loss at epoch"),
        ParamInfo::new("test_loss", "Test loss", Output, "Test loss at epoch"),
        ParamInfo::new("train_TPR", "TPR for train", Output, "True positive rate for training data"),
        ParamInfo::new("train_FPR", "FPR for train", Output, "False positive rate for training data"),
        ParamInfo::new("test_TPR", "TPR for test", Output, "True positive rate for test data"),
        ParamInfo::new("test_FPR", "FPR for test", Output, "False positive rate for test data"),
    ]);

    columns
}

/// Flatten a configuration in the order of `config_columns`
pub fn config_values(config: &RunConfig, space: &SearchSpace) -> Vec<String> {
    let layers = &config.neurons_per_layer;

    let mut values = vec![
        config.dataset.name().to_string(),
        config.noise.to_string(),
        config.perc_train.to_string(),
        config.batch_size.to_string(),
    ];
    values.extend((0..NUM_FEATURES).map(|f| {
        let selected = config.features_ids.contains(&f);
        (selected as u8).to_string()
    }));
    values.push(layers.len().to_string());
    values.push(layers.iter().sum::<usize>().to_string());
    values.extend(
        (0..space.max_hidden_layers()).map(|i| layers.get(i).copied().unwrap_or(0).to_string()),
    );
    values.extend([
        config.learning_rate.to_string(),
        config.activation.name().to_string(),
        config.regularization.name().to_string(),
        config.regularization_rate.to_string(),
    ]);

    values
}

/// Everything measured at one checkpoint of one run
#[derive(Clone, Debug)]
pub struct CheckpointRecord<'a> {
    pub row_index: usize,
    /// Relative to the group directory
    pub image_path: String,
    pub config: &'a RunConfig,
    pub epoch: usize,
    pub step: usize,
    pub total_time: f64,
    pub mean_time: f64,
    pub losses: Losses,
    pub train: Rates,
    pub test: Rates,
}

impl CheckpointRecord<'_> {
    /// Flatten in the order of `index_columns`
    pub fn to_row(&self, space: &SearchSpace) -> Vec<String> {
        let mut row = vec![self.row_index.to_string(), self.image_path.clone()];
        row.extend(config_values(self.config, space));
        row.extend([
            self.epoch.to_string(),
            self.step.to_string(),
            self.total_time.to_string(),
            self.mean_time.to_string(),
            self.losses.train.to_string(),
            self.losses.test.to_string(),
            self.train.tpr.to_string(),
            self.train.fpr.to_string(),
            self.test.tpr.to_string(),
            self.test.fpr.to_string(),
        ]);

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetKind;
    use crate::model::neural_net::{ActivationFunction, Regularization};

    fn config() -> RunConfig {
        RunConfig {
            dataset: DatasetKind::Circle,
            noise: 15,
            perc_train: 70,
            batch_size: 12,
            learning_rate: 0.003,
            neurons_per_layer: vec![4, 2, 7],
            activation: ActivationFunction::ReLU,
            regularization: Regularization::L2,
            regularization_rate: 0.3,
            features_ids: vec![0, 1, 5],
        }
    }

    #[test]
    fn config_values_line_up_with_their_columns() {
        let space = SearchSpace::default();
        let columns = config_columns(&space);
        let values = config_values(&config(), &space);

        assert_eq!(columns.len(), values.len());
        let lookup = |name: &str| {
            let idx = columns.iter().position(|c| c.name == name).unwrap();
            values[idx].as_str()
        };
        assert_eq!(lookup("data"), "circle");
        assert_eq!(lookup("X1"), "1");
        assert_eq!(lookup("X1Squared"), "0");
        assert_eq!(lookup("sinX1"), "1");
        assert_eq!(lookup("layer_count"), "3");
        assert_eq!(lookup("neuron_count"), "13");
        assert_eq!(lookup("H3"), "7");
        assert_eq!(lookup("H4"), "0");
        assert_eq!(lookup("H6"), "0");
        assert_eq!(lookup("learning_rate"), "0.003");
        assert_eq!(lookup("regularization"), "L2");
    }

    #[test]
    fn index_row_matches_header_width() {
        let space = SearchSpace::default();
        let config = config();
        let record = CheckpointRecord {
            row_index: 7,
            image_path: "images/7.png".to_string(),
            config: &config,
            epoch: 50,
            step: 400,
            total_time: 12.5,
            mean_time: 0.25,
            losses: Losses { train: 0.3, test: 0.4 },
            train: Rates { tpr: 1.0, fpr: 0.0 },
            test: Rates { tpr: 0.5, fpr: 0.25 },
        };

        let columns = index_columns(&space);
        let row = record.to_row(&space);

        assert_eq!(row.len(), columns.len());
        assert_eq!(columns[0].name, "ID");
        assert_eq!(columns[columns.len() - 1].name, "test_FPR");
        assert_eq!(row[..2], ["7".to_string(), "images/7.png".to_string()]);
        assert_eq!(row[row.len() - 1], "0.25");
    }

    #[test]
    fn neuron_columns_follow_the_hidden_layer_bound() {
        let space = SearchSpace {
            hidden_layers: 0..=2,
            ..SearchSpace::default()
        };
        let names: Vec<_> = config_columns(&space).into_iter().map(|c| c.name).collect();

        assert!(names.contains(&"H2".to_string()));
        assert!(!names.contains(&"H3".to_string()));
    }
}
