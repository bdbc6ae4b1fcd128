use starwake_config::ConfigError;
use starwake_space::SizeTableError;

/// Errors raised while building a [`Simulation`](crate::Simulation).
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid star size table: {0}")]
    SizeTable(#[from] SizeTableError),
}
