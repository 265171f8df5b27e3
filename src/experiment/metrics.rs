/// True and false positive rates of one population
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rates {
    pub tpr: f64,
    pub fpr: f64,
}

/// Compute TPR and FPR for labels in {0, 1}.
/// A rate whose population (positives for TPR, negatives for FPR) is empty is 0.
pub fn rates(y_true: &[u8], y_pred: &[u8]) -> Rates {
    debug_assert_eq!(y_true.len(), y_pred.len());

    let num_p = y_true.iter().filter(|y| **y == 1).count();
    let num_n = y_true.iter().filter(|y| **y == 0).count();
    let (num_tp, num_fp) = y_true
        .iter()
        .zip(y_pred)
        .fold((0, 0), |(tp, fp), (y, yp)| match (y, yp) {
            (1, 1) => (tp + 1, fp),
            (0, 1) => (tp, fp + 1),
            _ => (tp, fp),
        });

    let ratio = |count: usize, total: usize| {
        if count == 0 {
            0f64
        } else {
            count as f64 / total as f64
        }
    };

    Rates {
        tpr: ratio(num_tp, num_p),
        fpr: ratio(num_fp, num_n),
    }
}

/// Rates for the training prefix and the test suffix of a dataset
pub fn split_rates(labels: &[u8], predictions: &[u8], num_training: usize) -> (Rates, Rates) {
    let (train_y, test_y) = labels.split_at(num_training);
    let (train_yp, test_yp) = predictions.split_at(num_training);

    (rates(train_y, train_yp), rates(test_y, test_yp))
}
