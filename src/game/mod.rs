//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is advanced by calling [`GameEngine::tick`] directly, or by a
//! [`session`] task that applies ticks on a timer.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::{Axis, Command, Direction};
pub use config::{GameConfig, MAX_GRID_SIZE};
pub use engine::{GameEngine, TickOutcome};
pub use error::ConfigError;
pub use session::SessionHandle;
pub use state::{CollisionKind, GameSnapshot, GameState, Phase, Position, Snake};
