use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Courant number above one for the density range in use.
    #[error(
        "unstable step: courant number {courant:.4} exceeds 1 (max wave speed {max_wave_speed:.4})"
    )]
    UnstableStep { courant: f64, max_wave_speed: f64 },

    #[error("state contains non-finite densities")]
    NonFiniteState,

    #[error("invalid solver parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid flux model: {0}")]
    InvalidFlux(String),

    #[error("failed to write output: {0}")]
    Output(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
