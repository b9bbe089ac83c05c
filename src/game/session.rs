//! Single-writer driver for a [`GameEngine`]
//!
//! A session task owns the engine and is the only place ticks and commands are
//! applied, so the two never overlap. Ticks come from a timer that is only
//! polled while the game is `Running`; after every applied change the task
//! publishes a whole [`GameSnapshot`] on a `watch` channel, so readers never
//! see a half-applied tick.

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use super::{Command, GameEngine, GameSnapshot, Phase, TickOutcome};

/// Handle to a running session
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<GameSnapshot>,
    task: JoinHandle<GameEngine>,
}

impl SessionHandle {
    /// Queue a command. Returns false if the session has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A new reader of the snapshot stream
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the session and get the engine back
    pub async fn shutdown(self) -> Result<GameEngine, JoinError> {
        drop(self.commands);
        self.task.await
    }
}

/// Spawn a session task for `engine` on the current tokio runtime
pub fn spawn(engine: GameEngine) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

    let task = tokio::spawn(run(engine, command_rx, snapshot_tx));

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    }
}

async fn run(
    mut engine: GameEngine,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<GameSnapshot>,
) -> GameEngine {
    let period = engine.config().tick_interval();
    let mut tick_timer = interval_at(Instant::now() + period, period);
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let running = engine.phase() == Phase::Running;

        tokio::select! {
            maybe_command = commands.recv() => {
                let Some(command) = maybe_command else {
                    break;
                };

                if !engine.apply(command) {
                    continue;
                }

                // Entering Running restarts the clock so the first tick is a
                // full period away
                if !running && engine.phase() == Phase::Running {
                    tick_timer.reset();
                }
            }

            _ = tick_timer.tick(), if running => {
                if engine.tick() == TickOutcome::Stationary {
                    continue;
                }
            }
        }

        snapshots.send_replace(engine.snapshot());
    }

    debug!("session stopped");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, Position};
    use std::time::Duration;
    use tokio::time::sleep;

    fn session() -> SessionHandle {
        spawn(GameEngine::with_seed(GameConfig::default(), 5).unwrap())
    }

    // Lets the session task drain its queue without moving the clock
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_until_started() {
        let handle = session();

        sleep(Duration::from_millis(2_000)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, Phase::NotStarted);
        assert_eq!(snapshot.steps, 0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_configured_interval() {
        let handle = session();
        handle.send(Command::Start);
        handle.send(Command::Turn(Direction::Right));
        settle().await;

        // 200ms per tick: three ticks land by 650ms
        sleep(Duration::from_millis(650)).await;
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.head(), Position::new(13, 10));
        assert_eq!(snapshot.steps, 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticks() {
        let handle = session();
        handle.send(Command::Start);
        handle.send(Command::Turn(Direction::Down));
        sleep(Duration::from_millis(250)).await;
        settle().await;

        handle.send(Command::TogglePause);
        settle().await;
        let paused = handle.snapshot();
        assert_eq!(paused.phase, Phase::Paused);

        sleep(Duration::from_millis(5_000)).await;
        settle().await;
        assert_eq!(handle.snapshot(), paused);

        handle.send(Command::TogglePause);
        sleep(Duration::from_millis(250)).await;
        settle().await;
        assert_eq!(handle.snapshot().steps, paused.steps + 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_game_over() {
        let handle = session();
        let mut updates = handle.subscribe();

        handle.send(Command::Start);
        handle.send(Command::Turn(Direction::Up));

        // Ten cells to the top wall, the eleventh move collides
        let over = loop {
            updates.changed().await.unwrap();
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.is_over() {
                break snapshot;
            }
        };

        assert_eq!(over.head(), Position::new(10, 0));
        assert_eq!(over.steps, 10);

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.phase(), Phase::Over);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_start_screen() {
        let handle = session();
        handle.send(Command::Start);
        handle.send(Command::Turn(Direction::Left));
        sleep(Duration::from_millis(450)).await;

        handle.send(Command::Reset);
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, Phase::NotStarted);
        assert_eq!(snapshot.snake, vec![Position::new(10, 10)]);
        assert_eq!(snapshot.steps, 0);

        handle.shutdown().await.unwrap();
    }
}
