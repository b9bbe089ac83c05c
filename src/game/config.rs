use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::state::Position;

/// Largest grid the engine accepts; also what the terminal can draw
pub const MAX_GRID_SIZE: usize = 100;

/// Configuration for the game, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square grid
    pub grid_size: usize,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Single cell the snake starts on
    pub initial_snake: Position,
    /// Where the first piece of food is placed
    pub initial_food: Position,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            tick_interval_ms: 200,
            initial_snake: Position::new(10, 10),
            initial_food: Position::new(15, 15),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size and tick interval
    pub fn new(grid_size: usize, tick_interval_ms: u64) -> Self {
        Self {
            grid_size,
            tick_interval_ms,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Grid size in cell coordinates. Saturates for sizes `validate` rejects.
    pub fn side(&self) -> i32 {
        i32::try_from(self.grid_size).unwrap_or(i32::MAX)
    }

    /// Check if a position is within the grid
    pub fn contains(&self, pos: Position) -> bool {
        let side = self.side();
        (0..side).contains(&pos.x) && (0..side).contains(&pos.y)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                grid_size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        for (what, cell) in [("snake", self.initial_snake), ("food", self.initial_food)] {
            if !self.contains(cell) {
                return Err(ConfigError::CellOutOfBounds {
                    what,
                    cell,
                    grid_size: self.grid_size,
                });
            }
        }

        Ok(())
    }
}
