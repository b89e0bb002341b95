use std::{panic, thread};

use log::info;
use phasebridge_env::{
    router::{PhaseRouter, ScoreOf},
    session::GameLauncher,
};
use phasebridge_model::model::ForwardModel;
use rand::Rng;

use crate::episode::{self, EpisodeConfig, EpisodeError, EpisodeOutcome};

/// Upper bound (exclusive) of session seeds.
pub const SEED_RANGE: u64 = 1 << 16;

/// Draws `count` session seeds in `0..SEED_RANGE`.
pub fn draw_seeds<R>(rng: &mut R, count: usize) -> Vec<u64>
where
    R: Rng + ?Sized,
{
    (0..count).map(|_| rng.random_range(0..SEED_RANGE)).collect()
}

/// Plays every episode on its own scoped thread.
///
/// `launcher_factory` is called on the worker thread with the episode index, so launchers
/// and sessions never cross threads. Each worker owns its router; the model is shared by
/// reference. Results are returned in episode order, and a failing episode does not affect
/// the others.
///
/// # Panics
///
/// Re-raises the panic of any worker thread.
pub fn evaluate_parallel<F, L, M>(
    launcher_factory: F,
    model: &M,
    episodes: &[EpisodeConfig],
) -> Vec<Result<EpisodeOutcome<ScoreOf<L>>, EpisodeError>>
where
    F: Fn(usize) -> L + Sync,
    L: GameLauncher,
    ScoreOf<L>: Send,
    M: ForwardModel + ?Sized,
{
    info!("evaluating {} episodes in parallel", episodes.len());
    let launcher_factory = &launcher_factory;
    thread::scope(|s| {
        let handles = episodes
            .iter()
            .enumerate()
            .map(|(i, config)| {
                s.spawn(move || {
                    let launcher = launcher_factory(i);
                    let mut router = PhaseRouter::from_phase_config(launcher, model.phase_config());
                    episode::run_episode(&mut router, model, config)
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use phasebridge_env::session::{GameSession, LaunchSpec, SessionFailure, StepOutcome};
    use phasebridge_model::{
        activation::Activation,
        config::{LayerShape, PhaseConfig},
        model,
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    /// Game whose length and score are derived from the seed; seed 0 fails on the first step.
    #[derive(Debug)]
    struct SeededGame {
        released: Arc<AtomicUsize>,
    }

    struct SeededSession {
        seed: u64,
        played: u64,
        released: Arc<AtomicUsize>,
    }

    impl GameLauncher for SeededGame {
        type Session = SeededSession;

        fn launch(&self, spec: &LaunchSpec) -> Result<Self::Session, SessionFailure> {
            Ok(SeededSession {
                seed: spec.seed,
                played: 0,
                released: Arc::clone(&self.released),
            })
        }
    }

    impl GameSession for SeededSession {
        type Score = u64;

        fn init(&mut self) -> Result<(Vec<f64>, u64), SessionFailure> {
            Ok((vec![0.5], 0))
        }

        fn step(&mut self, _action_line: &str) -> Result<StepOutcome, SessionFailure> {
            if self.seed == 0 {
                return Err(SessionFailure::Exited {
                    reason: "exit code 1".to_owned(),
                });
            }
            self.played += 1;
            Ok(StepOutcome {
                observation: vec![0.5],
                phase: 0,
                reward: 1.0,
                done: self.played == self.seed,
            })
        }

        fn score(&self) -> u64 {
            self.played * 100
        }

        fn finalize(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_results_keep_episode_order() {
        let released = Arc::new(AtomicUsize::new(0));
        let config = PhaseConfig::single(1, 2).unwrap();
        let params = vec![0.1, 0.2, 0.3, 0.4];
        let model =
            model::build_model(config, &LayerShape::default(), Activation::Sigmoid, &params)
                .unwrap();

        let episodes: Vec<_> = [3, 1, 0, 5]
            .into_iter()
            .map(|seed| EpisodeConfig::new("seeded", seed, 100))
            .collect();
        let results = evaluate_parallel(
            |_| SeededGame {
                released: Arc::clone(&released),
            },
            &model,
            &episodes,
        );

        assert_eq!(results.len(), 4);
        let scores: Vec<Option<u64>> = results
            .iter()
            .map(|r| r.as_ref().ok().map(|o| o.score))
            .collect();
        assert_eq!(scores, vec![Some(300), Some(100), None, Some(500)]);
        assert!(matches!(
            results[2],
            Err(EpisodeError::Router(_))
        ));
        assert_eq!(released.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_draw_seeds() {
        let mut rng = Pcg64::seed_from_u64(5);
        let seeds = draw_seeds(&mut rng, 200);
        assert_eq!(seeds.len(), 200);
        assert!(seeds.iter().all(|&s| s < SEED_RANGE));

        let mut again = Pcg64::seed_from_u64(5);
        assert_eq!(draw_seeds(&mut again, 200), seeds);
    }
}
