use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::Path;

use crate::error::Result;

pub mod features;
pub mod synthetic;

/// The synthetic 2-D problems a run can be trained on
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Circle,
    Xor,
    Gauss,
    Spiral,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Circle,
        DatasetKind::Xor,
        DatasetKind::Gauss,
        DatasetKind::Spiral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Circle => "circle",
            DatasetKind::Xor => "xor",
            DatasetKind::Gauss => "gauss",
            DatasetKind::Spiral => "spiral",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Labelled points together with their expanded input features.
/// Row `i` of `points`, `features` and `labels` all describe the same sample.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub noise: u32,
    pub points: Array2<f64>,
    pub features: Array2<f64>,
    pub labels: Vec<u8>,
}

#[derive(Serialize)]
struct PointRecord {
    x: f64,
    y: f64,
    label: u8,
}

impl Dataset {
    /// Synthesise `num_samples` shuffled points of the given kind.
    /// `noise` is a percentage in [0, 50].
    pub fn generate<R: Rng + ?Sized>(
        kind: DatasetKind,
        num_samples: usize,
        noise: u32,
        rng: &mut R,
    ) -> Dataset {
        let factor = noise as f64 / 100f64;
        let mut samples = match kind {
            DatasetKind::Circle => synthetic::circle(num_samples, factor, rng),
            DatasetKind::Xor => synthetic::xor(num_samples, factor, rng),
            DatasetKind::Gauss => synthetic::gauss(num_samples, factor, rng),
            DatasetKind::Spiral => synthetic::spiral(num_samples, factor, rng),
        };
        // The train/test split takes a prefix, so the order must carry no structure
        samples.shuffle(rng);

        let points = Array2::from_shape_fn((samples.len(), 2), |(row, col)| samples[row].0[col]);
        let labels = samples.iter().map(|(_, label)| *label).collect();

        Dataset {
            kind,
            noise,
            features: features::feature_matrix(&points.view()),
            points,
            labels,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.labels.len()
    }

    /// Index of the first test sample for a given training percentage
    pub fn num_training(&self, perc_train: u32) -> usize {
        self.sample_count() * perc_train as usize / 100
    }

    /// Save the points as a tab-separated `x y label` table
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(File::create(path)?);

        for (point, label) in self.points.rows().into_iter().zip(&self.labels) {
            writer.serialize(PointRecord {
                x: point[0],
                y: point[1],
                label: *label,
            })?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    #[test]
    fn generated_rows_stay_aligned() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = Dataset::generate(DatasetKind::Xor, 200, 0, &mut rng);

        assert_eq!(data.sample_count(), 200);
        assert_eq!(data.points.nrows(), 200);
        assert_eq!(data.features.dim(), (200, features::NUM_FEATURES));
        for (i, point) in data.points.rows().into_iter().enumerate() {
            // without noise the xor label is a function of the point alone
            assert_eq!(data.labels[i] == 1, point[0] * point[1] >= 0.0);
            assert_eq!(data.features[[i, 0]], point[0]);
            assert_eq!(data.features[[i, 1]], point[1]);
        }
    }

    #[test]
    fn split_index_floors_the_percentage() {
        let mut rng = StdRng::seed_from_u64(2);
        let data = Dataset::generate(DatasetKind::Circle, 25, 10, &mut rng);

        assert_eq!(data.num_training(10), 2);
        assert_eq!(data.num_training(50), 12);
        assert_eq!(data.num_training(90), 22);
    }

    #[test]
    fn saves_one_line_per_point_after_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        let mut rng = StdRng::seed_from_u64(4);
        let data = Dataset::generate(DatasetKind::Spiral, 40, 25, &mut rng);

        data.save_to_file(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "x\ty\tlabel");
        assert_eq!(lines.len(), 41);
        assert!(lines[1..].iter().all(|l| l.split('\t').count() == 3));
    }
}
