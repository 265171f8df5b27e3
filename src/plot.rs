use log::debug;
use ndarray::Array2;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

use crate::dataset::{features, Dataset};
use crate::error::{Error, Result};
use crate::model::Model;

const DOMAIN: (f64, f64) = (-6.0, 6.0);
const NEGATIVE: RGBColor = RGBColor(0xf5, 0x93, 0x22);
const POSITIVE: RGBColor = RGBColor(0x08, 0x77, 0xbd);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlotSettings {
    /// Width and height of the image in pixels
    pub size: u32,
    /// Number of cells per axis of the decision-boundary grid
    pub grid: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings { size: 300, grid: 100 }
    }
}

fn plot_error<E: Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

fn label_color(label: u8) -> RGBColor {
    if label == 1 {
        POSITIVE
    } else {
        NEGATIVE
    }
}

/// Render the model's decision regions over the plotting domain, with the dataset on top.
/// Training points (the first `num_training`) get a white border, test points a black one.
pub fn render_decision_boundary<M: Model + ?Sized>(
    model: &M,
    dataset: &Dataset,
    num_training: usize,
    path: &Path,
    settings: &PlotSettings,
) -> Result<()> {
    let (lo, hi) = DOMAIN;
    let grid = settings.grid.max(1);
    let cell = (hi - lo) / grid as f64;

    // Cell centres, row-major from the bottom-left corner
    let centres = Array2::from_shape_fn((grid * grid, 2), |(i, axis)| {
        let index = if axis == 0 { i % grid } else { i / grid };
        lo + (index as f64 + 0.5) * cell
    });
    let predictions = model.predict_labels(&features::feature_matrix(&centres.view()).view());

    let root = BitMapBackend::new(path, (settings.size, settings.size)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(lo..hi, lo..hi)
        .map_err(plot_error)?;

    chart
        .draw_series(predictions.iter().enumerate().map(|(i, label)| {
            let x = lo + (i % grid) as f64 * cell;
            let y = lo + (i / grid) as f64 * cell;
            Rectangle::new([(x, y), (x + cell, y + cell)], label_color(*label).mix(0.4).filled())
        }))
        .map_err(plot_error)?;

    let points = dataset.points.rows().into_iter().zip(&dataset.labels).enumerate();
    for (i, (point, label)) in points {
        let (border, radius) = if i < num_training { (WHITE, 4) } else { (BLACK, 3) };
        let centre = (point[0], point[1]);
        chart
            .draw_series([
                Circle::new(centre, radius + 1, border.filled()),
                Circle::new(centre, radius, label_color(*label).filled()),
            ])
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    debug!("rendered {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetKind;
    use crate::model::Losses;
    use ndarray::ArrayView2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Predicts positive right of the vertical axis
    struct RightHalf;

    impl Model for RightHalf {
        fn train(&mut self, _: &Dataset, _: bool, _: usize) -> Losses {
            Losses::default()
        }

        fn losses(&self, _: &Dataset) -> Losses {
            Losses::default()
        }

        fn predict_labels(&self, features: &ArrayView2<f64>) -> Vec<u8> {
            features.column(0).iter().map(|x| (*x > 0.0) as u8).collect()
        }
    }

    #[test]
    fn writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.png");
        let data = Dataset::generate(DatasetKind::Circle, 30, 0, &mut StdRng::seed_from_u64(0));
        let settings = PlotSettings { size: 60, grid: 12 };

        render_decision_boundary(&RightHalf, &data, 20, &path, &settings).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
