//! Grid Snake - a tick-driven Snake game engine
//!
//! This library provides:
//! - Core game logic and its single-writer session driver (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering of game snapshots (render module)
//! - Per-run play statistics (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
