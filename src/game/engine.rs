use super::{
    action::{Command, Direction},
    config::GameConfig,
    error::ConfigError,
    state::{CollisionKind, GameSnapshot, GameState, Phase, Position, Snake},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, trace};

/// What a single call to [`GameEngine::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game is not running, nothing was applied
    Skipped,
    /// Running but no direction chosen yet
    Stationary,
    /// Snake moved one cell
    Moved,
    /// Snake moved onto the food and grew
    Ate,
    /// Snake hit something; the game is over
    Collided(CollisionKind),
}

/// The game engine. Owns all game state and is the only thing that mutates it.
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new engine, seeding food placement from OS entropy
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = Self::initial_state(&config);

        Ok(Self { config, state, rng })
    }

    fn initial_state(config: &GameConfig) -> GameState {
        GameState::new(Snake::new(config.initial_snake), config.initial_food)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Copy out the observable state
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from_state(&self.state, self.config.grid_size)
    }

    /// Dispatch a command. Returns whether it was accepted.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => {
                self.reset();
                true
            }
            Command::Turn(direction) => self.set_direction(direction),
        }
    }

    /// Leave the start screen. Only valid from `NotStarted`.
    pub fn start(&mut self) -> bool {
        if self.state.phase != Phase::NotStarted {
            trace!(phase = ?self.state.phase, "start ignored");
            return false;
        }

        self.state.phase = Phase::Running;
        info!("game started");
        true
    }

    /// Change direction. Ignored unless running, and ignored for turns along
    /// the axis the snake already moves on.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.state.phase != Phase::Running {
            trace!(?direction, phase = ?self.state.phase, "turn ignored");
            return false;
        }

        let current = self.state.snake.direction;
        if !current.can_turn_to(direction) {
            trace!(?current, ?direction, "turn rejected");
            return false;
        }

        self.state.snake.direction = direction;
        debug!(?direction, "direction changed");
        true
    }

    /// Flip between `Running` and `Paused`. Ignored in other phases.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.phase = match self.state.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            phase => {
                trace!(?phase, "pause toggle ignored");
                return false;
            }
        };

        debug!(phase = ?self.state.phase, "pause toggled");
        true
    }

    /// Restore the initial state. Valid from any phase.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.config);
        info!("game reset");
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != Phase::Running {
            return TickOutcome::Skipped;
        }

        let direction = self.state.snake.direction;
        if direction == Direction::None {
            return TickOutcome::Stationary;
        }

        let new_head = self.state.snake.head().moved_in_direction(direction);

        // On collision the pre-collision snake is kept for display
        if let Some(kind) = self.check_collision(new_head) {
            self.state.phase = Phase::Over;
            info!(?kind, score = self.state.score, "game over");
            return TickOutcome::Collided(kind);
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.advance(new_head, ate_food);
        self.state.steps += 1;

        if ate_food {
            self.state.score += 1;
            self.state.food = self.spawn_food();
            debug!(score = self.state.score, food = ?self.state.food, "food eaten");
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<CollisionKind> {
        if !self.config.contains(pos) {
            return Some(CollisionKind::Wall);
        }

        if self.state.snake.collides_with_body(pos) {
            return Some(CollisionKind::SelfCollision);
        }

        None
    }

    /// Pick a uniformly random cell for the next food.
    ///
    /// Occupied cells are not excluded, so food can land under the snake.
    fn spawn_food(&mut self) -> Position {
        let side = self.config.side();
        Position::new(self.rng.gen_range(0..side), self.rng.gen_range(0..side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn running_engine(cells: Vec<Position>, direction: Direction, food: Position) -> GameEngine {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 7).unwrap();
        engine.state = GameState::new(Snake::from_cells(cells, direction), food);
        engine.state.phase = Phase::Running;
        engine
    }

    fn cells(coords: &[(i32, i32)]) -> Vec<Position> {
        coords.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn test_initial_state() {
        let engine = GameEngine::new(GameConfig::default()).unwrap();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.snake, vec![Position::new(10, 10)]);
        assert_eq!(snapshot.food, Position::new(15, 15));
        assert_eq!(snapshot.direction, Direction::None);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.phase, Phase::NotStarted);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GameEngine::new(GameConfig::new(0, 200)).is_err());
        assert!(GameEngine::new(GameConfig::new(20, 0)).is_err());
    }

    #[test]
    fn test_start_only_from_not_started() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1).unwrap();

        assert!(engine.start());
        assert_eq!(engine.phase(), Phase::Running);
        assert!(!engine.start());

        engine.toggle_pause();
        assert!(!engine.start());
        assert_eq!(engine.phase(), Phase::Paused);
    }

    #[test]
    fn test_no_ticks_before_start() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1).unwrap();
        let before = engine.snapshot();

        assert!(!engine.set_direction(Direction::Right));
        assert_eq!(engine.tick(), TickOutcome::Skipped);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_stationary_tick() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1).unwrap();
        engine.start();

        assert_eq!(engine.tick(), TickOutcome::Stationary);
        assert_eq!(engine.phase(), Phase::Running);
        assert_eq!(engine.snapshot().snake, vec![Position::new(10, 10)]);
    }

    #[test]
    fn test_straight_run() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1).unwrap();
        engine.start();
        assert!(engine.set_direction(Direction::Right));

        for _ in 0..5 {
            assert_eq!(engine.tick(), TickOutcome::Moved);
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.snake, vec![Position::new(15, 10)]);
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.steps, 5);
    }

    #[test]
    fn test_eat_food() {
        let mut engine = running_engine(
            cells(&[(4, 10), (3, 10)]),
            Direction::Right,
            Position::new(5, 10),
        );

        assert_eq!(engine.tick(), TickOutcome::Ate);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.snake, cells(&[(5, 10), (4, 10), (3, 10)]));
        assert_eq!(snapshot.score, 1);
        assert!(engine.config().contains(snapshot.food));
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = running_engine(
            cells(&[(19, 10)]),
            Direction::Right,
            Position::new(15, 15),
        );

        assert_eq!(engine.tick(), TickOutcome::Collided(CollisionKind::Wall));
        assert_eq!(engine.phase(), Phase::Over);
        assert_eq!(engine.snapshot().snake, cells(&[(19, 10)]));
    }

    #[test]
    fn test_wall_collision_at_origin() {
        let mut engine = running_engine(cells(&[(0, 0)]), Direction::Up, Position::new(5, 5));

        assert_eq!(engine.tick(), TickOutcome::Collided(CollisionKind::Wall));
        assert_eq!(engine.snapshot().snake, cells(&[(0, 0)]));
    }

    #[test]
    fn test_self_collision() {
        let body = cells(&[(10, 10), (10, 11), (10, 12), (11, 12), (11, 11), (11, 10)]);
        let mut engine = running_engine(body.clone(), Direction::Down, Position::new(15, 15));

        assert_eq!(
            engine.tick(),
            TickOutcome::Collided(CollisionKind::SelfCollision)
        );
        assert_eq!(engine.phase(), Phase::Over);
        assert_eq!(engine.snapshot().snake, body);
    }

    #[test]
    fn test_moving_into_tail_is_collision() {
        // 2x2 loop: the head would step onto the cell the tail is leaving
        let mut engine = running_engine(
            cells(&[(5, 5), (6, 5), (6, 6), (5, 6)]),
            Direction::Down,
            Position::new(15, 15),
        );

        assert_eq!(
            engine.tick(),
            TickOutcome::Collided(CollisionKind::SelfCollision)
        );
    }

    #[test]
    fn test_reversal_guard() {
        let mut engine = running_engine(
            cells(&[(10, 10), (9, 10)]),
            Direction::Right,
            Position::new(15, 15),
        );

        assert!(!engine.set_direction(Direction::Left));
        assert_eq!(engine.snapshot().direction, Direction::Right);

        assert!(engine.set_direction(Direction::Down));
        assert_eq!(engine.snapshot().direction, Direction::Down);
    }

    #[test]
    fn test_none_is_not_a_turn() {
        let mut engine = running_engine(cells(&[(10, 10)]), Direction::Up, Position::new(15, 15));

        assert!(!engine.set_direction(Direction::None));
        assert_eq!(engine.snapshot().direction, Direction::Up);
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 3).unwrap();
        engine.start();
        engine.set_direction(Direction::Right);
        engine.tick();

        assert!(engine.toggle_pause());
        let frozen = engine.snapshot();

        for _ in 0..10 {
            assert_eq!(engine.tick(), TickOutcome::Skipped);
        }
        assert!(!engine.set_direction(Direction::Up));
        assert_eq!(engine.snapshot(), frozen);

        assert!(engine.toggle_pause());
        assert_eq!(engine.tick(), TickOutcome::Moved);
        assert_eq!(engine.snapshot().head(), Position::new(12, 10));
    }

    #[test]
    fn test_pause_ignored_outside_play() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 3).unwrap();
        assert!(!engine.toggle_pause());
        assert_eq!(engine.phase(), Phase::NotStarted);

        let mut engine = running_engine(cells(&[(19, 0)]), Direction::Right, Position::new(1, 1));
        engine.tick();
        assert!(!engine.toggle_pause());
        assert_eq!(engine.phase(), Phase::Over);
    }

    #[test]
    fn test_over_is_terminal() {
        let mut engine = running_engine(cells(&[(19, 10)]), Direction::Right, Position::new(1, 1));
        engine.tick();

        assert!(!engine.apply(Command::Start));
        assert!(!engine.apply(Command::Turn(Direction::Up)));
        assert_eq!(engine.tick(), TickOutcome::Skipped);
        assert_eq!(engine.phase(), Phase::Over);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let fresh = GameEngine::with_seed(GameConfig::default(), 9)
            .unwrap()
            .snapshot();

        let mut engine = GameEngine::with_seed(GameConfig::default(), 9).unwrap();
        engine.reset();
        assert_eq!(engine.snapshot(), fresh);

        engine.start();
        engine.set_direction(Direction::Right);
        engine.tick();
        engine.reset();
        assert_eq!(engine.snapshot(), fresh);

        engine.start();
        engine.toggle_pause();
        assert!(engine.apply(Command::Reset));
        assert_eq!(engine.snapshot(), fresh);

        let mut engine = running_engine(cells(&[(19, 10)]), Direction::Right, Position::new(4, 4));
        engine.state.score = 12;
        engine.tick();
        engine.reset();
        assert_eq!(engine.snapshot(), fresh);
        engine.reset();
        assert_eq!(engine.snapshot(), fresh);
    }

    #[test]
    fn test_oversized_grid_cannot_build_engine() {
        let config = GameConfig {
            grid_size: 1usize << 32,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameEngine::new(config),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_eating_on_largest_grid() {
        let config = GameConfig::new(crate::game::config::MAX_GRID_SIZE, 200);
        let mut engine = GameEngine::with_seed(config, 4).unwrap();
        engine.state = GameState::new(
            Snake::from_cells(cells(&[(10, 10)]), Direction::Right),
            Position::new(11, 10),
        );
        engine.state.phase = Phase::Running;

        assert_eq!(engine.tick(), TickOutcome::Ate);
        assert!(engine.config().contains(engine.snapshot().food));
    }

    #[test]
    fn test_food_can_spawn_anywhere_in_grid() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 11).unwrap();
        for _ in 0..500 {
            let food = engine.spawn_food();
            assert!(engine.config().contains(food));
        }
    }

    #[test]
    fn test_random_play_keeps_invariants() {
        let config = GameConfig {
            grid_size: 6,
            initial_snake: Position::new(2, 2),
            initial_food: Position::new(4, 4),
            ..GameConfig::default()
        };
        let mut engine = GameEngine::with_seed(config, 42).unwrap();
        let mut rng = StdRng::seed_from_u64(1234);
        let directions = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

        for _ in 0..5_000 {
            if engine.phase() == Phase::NotStarted {
                engine.start();
            }

            // Bias toward going straight so the snake gets a chance to grow
            if rng.gen_bool(0.3) {
                engine.set_direction(directions[rng.gen_range(0..directions.len())]);
            }

            let before = engine.snapshot();
            let outcome = engine.tick();
            let after = engine.snapshot();

            match outcome {
                TickOutcome::Ate => {
                    assert_eq!(after.snake.len(), before.snake.len() + 1);
                    assert_eq!(after.score, before.score + 1);
                }
                TickOutcome::Moved => {
                    assert_eq!(after.snake.len(), before.snake.len());
                    assert_eq!(after.score, before.score);
                }
                TickOutcome::Collided(_) => {
                    assert_eq!(after.snake, before.snake);
                    assert_eq!(after.phase, Phase::Over);
                }
                TickOutcome::Stationary | TickOutcome::Skipped => {
                    assert_eq!(after.snake, before.snake);
                }
            }

            if after.phase == Phase::Over {
                engine.reset();
                continue;
            }

            let unique: HashSet<_> = after.snake.iter().collect();
            assert_eq!(unique.len(), after.snake.len());
            assert!(after.snake.iter().all(|&cell| engine.config().contains(cell)));
        }
    }
}
