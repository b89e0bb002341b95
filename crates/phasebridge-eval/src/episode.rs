use log::{debug, info};
use phasebridge_env::{
    router::{PhaseRouter, RouterError, ScoreOf},
    session::GameLauncher,
};
use phasebridge_model::{ModelError, model::ForwardModel};

/// One playthrough to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeConfig {
    pub game: String,
    pub seed: u64,
    /// Maximum number of steps before the episode is cut off.
    pub step_limit: usize,
}

impl EpisodeConfig {
    #[must_use]
    pub fn new(game: impl Into<String>, seed: u64, step_limit: usize) -> Self {
        Self {
            game: game.into(),
            seed,
            step_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome<S> {
    /// Number of steps that reached the game.
    pub steps: usize,
    pub total_reward: f64,
    pub final_phase: usize,
    /// `false` if the episode hit its step limit first.
    pub done: bool,
    pub score: S,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EpisodeError {
    #[display("model evaluation failed: {_0}")]
    Model(ModelError),
    #[display("{_0}")]
    Router(RouterError),
}

impl From<ModelError> for EpisodeError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl From<RouterError> for EpisodeError {
    fn from(err: RouterError) -> Self {
        Self::Router(err)
    }
}

/// Plays one episode of `model` through `router`.
///
/// Each step evaluates the model on the last observation for the current phase, places the
/// output in its segment of the combined action and hands it to the router. The loop stops
/// when the game is done or after `step_limit` steps. The session is finalized on return,
/// including on error.
pub fn run_episode<L, M>(
    router: &mut PhaseRouter<L>,
    model: &M,
    config: &EpisodeConfig,
) -> Result<EpisodeOutcome<ScoreOf<L>>, EpisodeError>
where
    L: GameLauncher,
    M: ForwardModel + ?Sized,
{
    let outcome = play(router, model, config);
    router.finalize();
    outcome
}

fn play<L, M>(
    router: &mut PhaseRouter<L>,
    model: &M,
    config: &EpisodeConfig,
) -> Result<EpisodeOutcome<ScoreOf<L>>, EpisodeError>
where
    L: GameLauncher,
    M: ForwardModel + ?Sized,
{
    router.start(&config.game, config.seed)?;

    let mut steps = 0;
    let mut total_reward = 0.0;
    while steps < config.step_limit && !router.is_done() {
        let phase = router.current_phase();
        let action = model.evaluate(router.observation(), phase)?;
        let combined = router.embed_action(phase, action.values())?;
        let result = router.step(&combined)?;
        steps += 1;
        total_reward += result.reward;
        debug!("step {steps}: reward {}, done {}", result.reward, result.done);
    }

    let score = router.score().cloned().ok_or(RouterError::NotStarted)?;
    info!(
        "episode `{}` (seed {}) ended after {steps} steps, total reward {total_reward}, score {score:?}",
        config.game, config.seed
    );
    Ok(EpisodeOutcome {
        steps,
        total_reward,
        final_phase: router.current_phase(),
        done: router.is_done(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use phasebridge_env::session::{GameSession, LaunchSpec, SessionFailure, StepOutcome};
    use phasebridge_model::{
        activation::Activation,
        config::{LayerShape, PhaseConfig},
        model::{self, Baseline, BaselinePolicy},
    };

    use super::*;

    /// Two-phase game: one step in phase 0, then phase 1 until `length` steps are played.
    #[derive(Debug, Clone)]
    struct Countdown {
        length: usize,
        released: Rc<Cell<usize>>,
    }

    struct CountdownSession {
        length: usize,
        played: usize,
        total: f64,
        released: Rc<Cell<usize>>,
    }

    impl GameLauncher for Countdown {
        type Session = CountdownSession;

        fn launch(&self, _spec: &LaunchSpec) -> Result<Self::Session, SessionFailure> {
            Ok(CountdownSession {
                length: self.length,
                played: 0,
                total: 0.0,
                released: Rc::clone(&self.released),
            })
        }
    }

    impl GameSession for CountdownSession {
        type Score = f64;

        fn init(&mut self) -> Result<(Vec<f64>, f64), SessionFailure> {
            Ok((vec![1.0, 0.0], 0.0))
        }

        fn step(&mut self, action_line: &str) -> Result<StepOutcome, SessionFailure> {
            let values: Vec<f64> = action_line
                .split(' ')
                .map(|v| v.parse().unwrap())
                .collect();
            let expected = if self.played == 0 { 2 } else { 3 };
            if values.len() != expected {
                return Err(SessionFailure::Protocol {
                    reason: format!("expected {expected} values"),
                });
            }
            self.played += 1;
            let reward: f64 = values.iter().sum();
            self.total += reward;
            Ok(StepOutcome {
                observation: vec![0.0, 1.0],
                phase: 1,
                reward,
                done: self.played == self.length,
            })
        }

        fn score(&self) -> f64 {
            self.total
        }

        fn finalize(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn game() -> PhaseConfig {
        PhaseConfig::new(vec![2, 2], vec![2, 3]).unwrap()
    }

    #[test]
    fn test_runs_until_done() {
        let released = Rc::default();
        let launcher = Countdown {
            length: 4,
            released: Rc::clone(&released),
        };
        let model = Baseline::new(game(), BaselinePolicy::Constant { value: 0.5 }, 0);
        let mut router = PhaseRouter::from_phase_config(launcher, &game());

        let outcome = run_episode(&mut router, &model, &EpisodeConfig::new("countdown", 3, 100))
            .unwrap();
        assert_eq!(outcome.steps, 4);
        assert!(outcome.done);
        assert_eq!(outcome.final_phase, 1);
        // 1.0 in phase 0, then 1.5 per step in phase 1
        assert!((outcome.total_reward - 5.5).abs() < 1e-12);
        assert!((outcome.score - 5.5).abs() < 1e-12);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_stops_at_step_limit() {
        let released = Rc::default();
        let launcher = Countdown {
            length: 50,
            released: Rc::clone(&released),
        };
        let model = Baseline::new(game(), BaselinePolicy::Uniform, 1);
        let mut router = PhaseRouter::from_phase_config(launcher, &game());

        let outcome =
            run_episode(&mut router, &model, &EpisodeConfig::new("countdown", 0, 5)).unwrap();
        assert_eq!(outcome.steps, 5);
        assert!(!outcome.done);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_model_error_still_finalizes() {
        let released = Rc::default();
        let launcher = Countdown {
            length: 3,
            released: Rc::clone(&released),
        };
        // model expects three inputs, game sends two
        let wrong = PhaseConfig::new(vec![3, 3], vec![2, 3]).unwrap();
        let params = vec![0.0; 4 * 2 + 4 * 3];
        let model =
            model::build_model(wrong, &LayerShape::default(), Activation::Tanh, &params).unwrap();
        let mut router = PhaseRouter::from_phase_config(launcher, &game());

        let err =
            run_episode(&mut router, &model, &EpisodeConfig::new("countdown", 0, 10)).unwrap_err();
        assert!(matches!(
            err,
            EpisodeError::Model(ModelError::DimensionMismatch { .. })
        ));
        assert_eq!(released.get(), 1);
    }
}
