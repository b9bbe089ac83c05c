use std::path::PathBuf;

use thiserror::Error;

use super::state::Position;

/// Reasons a [`GameConfig`](super::GameConfig) cannot be used to build an engine
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size must be greater than zero")]
    ZeroGridSize,

    #[error("grid size {grid_size} exceeds the maximum of {max}")]
    GridTooLarge { grid_size: usize, max: usize },

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("initial {what} at {cell} is outside the {grid_size}x{grid_size} grid")]
    CellOutOfBounds {
        what: &'static str,
        cell: Position,
        grid_size: usize,
    },

    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
