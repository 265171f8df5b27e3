use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop an experiment invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested group-iteration mode is not one we know about
    #[error("invalid mode: {0} (expected `full` or `psa_runs`)")]
    InvalidMode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write tabular output: {0}")]
    Csv(#[from] csv::Error),

    /// The plot backend failed to draw or encode the image
    #[error("failed to render plot: {0}")]
    Plot(String),
}
