use ndarray::{Array2, ArrayView2};

pub const NUM_FEATURES: usize = 7;

/// Names of the input transforms, indexed by feature id
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "X1",
    "X2",
    "X1Squared",
    "X2Squared",
    "X1X2",
    "sinX1",
    "sinX2",
];

/// Every feature id, in ascending order
pub fn all_features() -> Vec<usize> {
    (0..NUM_FEATURES).collect()
}

fn transform(feature: usize, x1: f64, x2: f64) -> f64 {
    match feature {
        0 => x1,
        1 => x2,
        2 => x1 * x1,
        3 => x2 * x2,
        4 => x1 * x2,
        5 => x1.sin(),
        6 => x2.sin(),
        _ => unreachable!("feature id {feature} out of range"),
    }
}

/// Expand (n, 2) coordinates into the full (n, NUM_FEATURES) feature matrix
pub fn feature_matrix(points: &ArrayView2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((points.nrows(), NUM_FEATURES), |(row, feature)| {
        transform(feature, points[[row, 0]], points[[row, 1]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn expands_each_point_into_every_transform() {
        let points = array![[2.0, -3.0], [0.0, 0.5]];
        let features = feature_matrix(&points.view());

        assert_eq!(features.dim(), (2, NUM_FEATURES));
        assert_eq!(features.row(0).to_vec()[..5], [2.0, -3.0, 4.0, 9.0, -6.0]);
        assert!((features[[0, 5]] - 2f64.sin()).abs() < 1e-12);
        assert!((features[[1, 6]] - 0.5f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn names_cover_all_features() {
        assert_eq!(all_features().len(), FEATURE_NAMES.len());
    }
}
