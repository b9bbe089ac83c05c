use serde::{Deserialize, Serialize};

/// Axis a direction moves along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Direction the snake is moving in. `None` means standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    /// Axis of movement, if any
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Direction::Up | Direction::Down => Some(Axis::Vertical),
            Direction::Left | Direction::Right => Some(Axis::Horizontal),
            Direction::None => None,
        }
    }

    /// Returns true if a snake moving in `self` may switch to `next`.
    ///
    /// A turn is only allowed onto the other axis, which rules out both
    /// reversals and repeats of the current direction. Any real direction is
    /// allowed while standing still; `None` is never a valid turn.
    pub fn can_turn_to(&self, next: Direction) -> bool {
        match next.axis() {
            Some(axis) => self.axis() != Some(axis),
            None => false,
        }
    }
}

/// Request an external collaborator can submit to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the start screen
    Start,
    /// Pause a running game or resume a paused one
    TogglePause,
    /// Restore the initial state
    Reset,
    /// Change direction
    Turn(Direction),
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Command::Turn(direction)
    }
}
