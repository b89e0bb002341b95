use std::fmt;

use log::{debug, info, warn};
use phasebridge_model::{action, config::PhaseConfig};

use crate::session::{GameLauncher, GameSession, LaunchSpec, SessionFailure};

/// Score type of the sessions a launcher creates.
pub type ScoreOf<L> = <<L as GameLauncher>::Session as GameSession>::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RouterState {
    /// No session is held.
    Idle,
    /// A session is running and accepts actions.
    Active,
    /// The game finished or failed; further steps are no-ops until the session is released.
    Done,
}

/// What the router knows about the game between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState<S> {
    pub current_phase: usize,
    pub done: bool,
    pub score: S,
    pub observation: Vec<f64>,
}

/// Result of one [`PhaseRouter::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<S> {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
    pub score: S,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RouterError {
    #[display("game has {expected} phases, got {got} action counts")]
    PhaseCountMismatch { expected: usize, got: usize },
    #[display("phase {phase} needs {expected} action values, got {got}")]
    DimensionMismatch {
        phase: usize,
        expected: usize,
        got: usize,
    },
    #[display("phase {phase} is out of range for a game with {phase_count} phases")]
    InvalidPhase { phase: usize, phase_count: usize },
    #[display("no game session is running")]
    NotStarted,
    #[display("game session failed: {_0}")]
    Session(SessionFailure),
}

impl From<SessionFailure> for RouterError {
    fn from(err: SessionFailure) -> Self {
        Self::Session(err)
    }
}

fn segment_offsets(action_counts: &[usize]) -> Vec<usize> {
    action_counts
        .iter()
        .scan(0, |begin, &count| {
            let offset = *begin;
            *begin += count;
            Some(offset)
        })
        .collect()
}

/// Exposes an external game as discrete steps over a combined action space.
///
/// The combined action is the concatenation of every phase's action segment. Each step
/// forwards only the segment of the phase the game is currently in:
///
/// ```text
/// action_counts = [2, 3]
/// combined      = [a0, a1, b0, b1, b2]
/// phase 0       → "a0 a1"
/// phase 1       → "b0 b1 b2"
/// ```
///
/// The router holds at most one session. [`PhaseRouter::finalize`] releases it and runs on
/// drop, so the game process is released on every exit path.
pub struct PhaseRouter<L>
where
    L: GameLauncher,
{
    launcher: L,
    action_counts: Vec<usize>,
    offsets: Vec<usize>,
    session: Option<L::Session>,
    session_state: Option<SessionState<ScoreOf<L>>>,
}

impl<L> PhaseRouter<L>
where
    L: GameLauncher,
{
    /// Creates a router with an explicit action count per phase.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::PhaseCountMismatch`] if `action_counts` does not have one entry
    /// per phase of `config`.
    pub fn new(
        launcher: L,
        config: &PhaseConfig,
        action_counts: Vec<usize>,
    ) -> Result<Self, RouterError> {
        if action_counts.len() != config.phase_count() {
            return Err(RouterError::PhaseCountMismatch {
                expected: config.phase_count(),
                got: action_counts.len(),
            });
        }
        Ok(Self {
            launcher,
            offsets: segment_offsets(&action_counts),
            action_counts,
            session: None,
            session_state: None,
        })
    }

    /// Creates a router whose action segments are the phases' output widths.
    #[must_use]
    pub fn from_phase_config(launcher: L, config: &PhaseConfig) -> Self {
        Self {
            launcher,
            action_counts: config.output_sizes().to_vec(),
            offsets: segment_offsets(config.output_sizes()),
            session: None,
            session_state: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> RouterState {
        match (&self.session, &self.session_state) {
            (Some(_), Some(state)) if state.done => RouterState::Done,
            (Some(_), Some(_)) => RouterState::Active,
            _ => RouterState::Idle,
        }
    }

    /// State of the held session, or `None` while idle.
    #[must_use]
    pub fn session_state(&self) -> Option<&SessionState<ScoreOf<L>>> {
        self.session_state.as_ref()
    }

    #[must_use]
    pub fn current_phase(&self) -> usize {
        self.session_state.as_ref().map_or(0, |s| s.current_phase)
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.session_state.as_ref().is_some_and(|s| s.done)
    }

    #[must_use]
    pub fn score(&self) -> Option<&ScoreOf<L>> {
        self.session_state.as_ref().map(|s| &s.score)
    }

    #[must_use]
    pub fn observation(&self) -> &[f64] {
        self.session_state
            .as_ref()
            .map_or(&[][..], |s| &s.observation)
    }

    #[must_use]
    pub fn action_counts(&self) -> &[usize] {
        &self.action_counts
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.action_counts.len()
    }

    /// Width of the combined action vector.
    #[must_use]
    pub fn combined_action_width(&self) -> usize {
        self.action_counts.iter().sum()
    }

    /// Starts a new session and returns its first observation.
    ///
    /// A session still held from a previous run is released and its state discarded first.
    /// If the game cannot be launched or initialized the router is left idle.
    pub fn start(&mut self, game: &str, seed: u64) -> Result<&[f64], RouterError> {
        self.finalize();
        self.session_state = None;

        let spec = LaunchSpec::new(game, seed);
        info!("starting game `{}` with seed {}", spec.game, spec.seed);
        let mut session = self.launcher.launch(&spec).inspect_err(|err| {
            warn!("{err}");
        })?;
        let (observation, score) = match session.init() {
            Ok(init) => init,
            Err(err) => {
                warn!("failed to initialize game `{game}`: {err}");
                session.finalize();
                return Err(err.into());
            }
        };

        self.session = Some(session);
        let state = self.session_state.insert(SessionState {
            current_phase: 0,
            done: false,
            score,
            observation,
        });
        Ok(&state.observation)
    }

    /// Sends the current phase's segment of `combined_action` to the game.
    ///
    /// Once the game is done every call returns the last observation and score with a reward
    /// of `0` and does not touch the session.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NotStarted`] if no session is held
    /// - [`RouterError::DimensionMismatch`] if `combined_action` ends before the current
    ///   segment; the router is left unchanged
    /// - [`RouterError::Session`] if the game fails or reports an unknown phase; the router
    ///   becomes [`RouterState::Done`]
    pub fn step(
        &mut self,
        combined_action: &[f64],
    ) -> Result<StepResult<ScoreOf<L>>, RouterError> {
        let (Some(session), Some(state)) = (self.session.as_mut(), self.session_state.as_mut())
        else {
            return Err(RouterError::NotStarted);
        };

        if state.done {
            return Ok(StepResult {
                observation: state.observation.clone(),
                reward: 0.0,
                done: true,
                score: state.score.clone(),
            });
        }

        let phase = state.current_phase;
        let begin = self.offsets[phase];
        let end = begin + self.action_counts[phase];
        let segment = combined_action
            .get(begin..end)
            .ok_or(RouterError::DimensionMismatch {
                phase,
                expected: end,
                got: combined_action.len(),
            })?;

        let line = action::encode_line(segment);
        debug!("phase {phase}: sending `{line}`");
        let outcome = match session.step(&line) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("game session failed in phase {phase}: {err}");
                state.done = true;
                return Err(err.into());
            }
        };
        if outcome.phase >= self.action_counts.len() {
            state.done = true;
            let err = SessionFailure::Protocol {
                reason: format!(
                    "reported phase {} of a game with {} phases",
                    outcome.phase,
                    self.action_counts.len()
                ),
            };
            warn!("{err}");
            return Err(err.into());
        }
        if outcome.phase != phase {
            debug!("phase transition {phase} -> {}", outcome.phase);
        }

        state.current_phase = outcome.phase;
        state.observation = outcome.observation;
        state.done = outcome.done;
        state.score = session.score();
        if state.done {
            debug!("game finished with score {:?}", state.score);
        }

        Ok(StepResult {
            observation: state.observation.clone(),
            reward: outcome.reward,
            done: state.done,
            score: state.score.clone(),
        })
    }

    /// Places a phase-local action into a zero-filled combined action vector.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPhase`] for an unknown phase and
    /// [`RouterError::DimensionMismatch`] if `local` does not fill the phase's segment.
    pub fn embed_action(&self, phase: usize, local: &[f64]) -> Result<Vec<f64>, RouterError> {
        let (Some(&begin), Some(&count)) = (self.offsets.get(phase), self.action_counts.get(phase))
        else {
            return Err(RouterError::InvalidPhase {
                phase,
                phase_count: self.phase_count(),
            });
        };
        if local.len() != count {
            return Err(RouterError::DimensionMismatch {
                phase,
                expected: count,
                got: local.len(),
            });
        }
        let mut combined = vec![0.0; self.combined_action_width()];
        combined[begin..begin + count].copy_from_slice(local);
        Ok(combined)
    }

    /// Releases the held session, if any.
    ///
    /// Safe to call before [`PhaseRouter::start`] and any number of times; the session is
    /// finalized exactly once. Its [`SessionState`] is discarded, so read the final score
    /// before calling this.
    pub fn finalize(&mut self) {
        if let Some(mut session) = self.session.take() {
            info!("finalizing game session");
            session.finalize();
        }
        self.session_state = None;
    }
}

impl<L> Drop for PhaseRouter<L>
where
    L: GameLauncher,
{
    fn drop(&mut self) {
        self.finalize();
    }
}

impl<L> fmt::Debug for PhaseRouter<L>
where
    L: GameLauncher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseRouter")
            .field("state", &self.state())
            .field("action_counts", &self.action_counts)
            .field("session_state", &self.session_state)
            .finish_non_exhaustive()
    }
}
