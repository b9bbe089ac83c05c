use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    /// Body segments, with head at index 0. Never empty.
    body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a one-cell snake standing still
    pub fn new(head: Position) -> Self {
        Self {
            body: vec![head],
            direction: Direction::None,
        }
    }

    /// Build a snake from explicit cells, head first
    #[cfg(test)]
    pub(crate) fn from_cells(cells: Vec<Position>, direction: Direction) -> Self {
        assert!(!cells.is_empty(), "snake needs at least one cell");
        Self {
            body: cells,
            direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// All cells, head first
    pub fn cells(&self) -> &[Position] {
        &self.body
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head).
    /// The tail counts even though it would move away this tick.
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Put a new head in front of the snake, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake has no segments
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle phase of the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting on the start screen
    #[default]
    NotStarted,
    Running,
    Paused,
    /// Collision happened; only a reset leaves this phase
    Over,
}

/// Type of collision that ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Snake left the grid
    Wall,
    /// Snake ran into its own body
    SelfCollision,
}

/// Complete mutable game state, owned by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub score: u32,
    pub steps: u32,
    pub phase: Phase,
}

impl GameState {
    /// Create a fresh state in the `NotStarted` phase
    pub fn new(snake: Snake, food: Position) -> Self {
        Self {
            snake,
            food,
            score: 0,
            steps: 0,
            phase: Phase::NotStarted,
        }
    }
}

/// Read-only copy of everything an observer may look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Snake cells, head first
    pub snake: Vec<Position>,
    pub food: Position,
    pub direction: Direction,
    pub score: u32,
    pub steps: u32,
    pub phase: Phase,
    pub grid_size: usize,
}

impl GameSnapshot {
    pub fn from_state(state: &GameState, grid_size: usize) -> Self {
        Self {
            snake: state.snake.cells().to_vec(),
            food: state.food,
            direction: state.snake.direction,
            score: state.score,
            steps: state.steps,
            phase: state.phase,
            grid_size,
        }
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }
}
