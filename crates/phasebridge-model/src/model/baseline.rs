use std::sync::{Mutex, PoisonError};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{ModelError, action::Action, config::PhaseConfig};

use super::{ForwardModel, check_input};

/// Non-learned reference policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Every output drawn from `U(0, 1)`.
    #[display("uniform")]
    Uniform,
    /// Every output fixed to `value`.
    #[display("constant({value})")]
    Constant { value: f64 },
}

/// A policy that ignores its observation.
///
/// Outputs are returned as drawn, without normalization, so a uniform baseline keeps its
/// spread across `[0, 1)`. The random stream is shared by all phases and advances on every
/// call.
#[derive(Debug)]
pub struct Baseline {
    config: PhaseConfig,
    policy: BaselinePolicy,
    rng: Mutex<Pcg64>,
}

impl Baseline {
    #[must_use]
    pub fn new(config: PhaseConfig, policy: BaselinePolicy, seed: u64) -> Self {
        Self {
            config,
            policy,
            rng: Mutex::new(Pcg64::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn policy(&self) -> BaselinePolicy {
        self.policy
    }
}

impl ForwardModel for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn phase_config(&self) -> &PhaseConfig {
        &self.config
    }

    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError> {
        check_input(&self.config, input, phase)?;
        let width = self.config.output_sizes()[phase];
        let values = match self.policy {
            BaselinePolicy::Uniform => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                (0..width).map(|_| rng.random::<f64>()).collect()
            }
            BaselinePolicy::Constant { value } => vec![value; width],
        };
        Ok(Action::new(values))
    }
}
