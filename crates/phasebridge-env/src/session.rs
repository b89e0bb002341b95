//! Contracts of the process-backed game the router drives.
//!
//! How a game process is spawned and how bytes move over its channels is up to the
//! implementor; the router only relies on the calls below and on `finalize` being safe to
//! repeat.

use std::fmt;

/// Failure of the external game process. Always terminal for the session it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionFailure {
    #[display("failed to launch game `{game}`: {reason}")]
    Launch { game: String, reason: String },
    #[display("game process did not respond: {reason}")]
    Unresponsive { reason: String },
    #[display("game process exited unexpectedly: {reason}")]
    Exited { reason: String },
    #[display("game process broke the session protocol: {reason}")]
    Protocol { reason: String },
}

/// What the game reports back after consuming one action line.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    /// Phase the game is in after the step; selects the next action segment.
    pub phase: usize,
    pub reward: f64,
    pub done: bool,
}

/// Identity of a session to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub game: String,
    pub batch_size: usize,
    pub seed: u64,
}

impl LaunchSpec {
    /// A single-game batch of `game` seeded with `seed`.
    #[must_use]
    pub fn new(game: impl Into<String>, seed: u64) -> Self {
        Self {
            game: game.into(),
            batch_size: 1,
            seed,
        }
    }
}

/// One live playthrough of an external game.
pub trait GameSession {
    /// Game-defined score, opaque to the router.
    type Score: Clone + fmt::Debug;

    /// Starts the game, returning the first observation and the initial score.
    fn init(&mut self) -> Result<(Vec<f64>, Self::Score), SessionFailure>;

    /// Sends one encoded action line and waits for the game's answer.
    fn step(&mut self, action_line: &str) -> Result<StepOutcome, SessionFailure>;

    /// Current score.
    fn score(&self) -> Self::Score;

    /// Releases every resource held by the session. Must be idempotent.
    fn finalize(&mut self);
}

/// Creates game sessions.
pub trait GameLauncher {
    type Session: GameSession;

    fn launch(&self, spec: &LaunchSpec) -> Result<Self::Session, SessionFailure>;
}

impl<L> GameLauncher for &L
where
    L: GameLauncher + ?Sized,
{
    type Session = L::Session;

    fn launch(&self, spec: &LaunchSpec) -> Result<Self::Session, SessionFailure> {
        (**self).launch(spec)
    }
}
