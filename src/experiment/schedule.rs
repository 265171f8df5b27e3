/// Epochs at which every run is measured and recorded
pub const CHECKPOINT_EPOCHS: [usize; 5] = [25, 50, 100, 200, 400];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: usize,
    /// Cumulative number of batches trained once this checkpoint is reached
    pub step: usize,
    /// Batches to train since the previous checkpoint
    pub delta: usize,
}

/// Cumulative step targets for an ascending list of epochs.
/// A target that does not move past the previous one yields a zero delta.
pub fn checkpoints(epochs: &[usize], sample_count: usize, batch_size: usize) -> Vec<Checkpoint> {
    let batch_size = batch_size.max(1);
    let mut prev_step = 0;

    epochs
        .iter()
        .map(|&epoch| {
            let step = (epoch * sample_count / batch_size).max(prev_step);
            let delta = step - prev_step;
            prev_step = step;

            Checkpoint { epoch, step, delta }
        })
        .collect()
}
