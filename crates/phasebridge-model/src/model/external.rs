use std::fmt;

use crate::{ModelError, action::Action, config::PhaseConfig};

use super::{ForwardModel, check_input};

/// A policy trained outside this crate, e.g. loaded from another framework's checkpoint.
///
/// Implemented for any `Fn(&[f64], usize) -> Vec<f64>` closure.
pub trait TrainedPolicy: Send + Sync {
    /// Raw outputs for `input` in `phase`.
    fn predict(&self, input: &[f64], phase: usize) -> Vec<f64>;
}

impl<F> TrainedPolicy for F
where
    F: Fn(&[f64], usize) -> Vec<f64> + Send + Sync,
{
    fn predict(&self, input: &[f64], phase: usize) -> Vec<f64> {
        self(input, phase)
    }
}

/// Adapts a [`TrainedPolicy`] to the [`ForwardModel`] interface.
///
/// Outputs are min–max normalized like those of the learned models.
pub struct External<P> {
    name: &'static str,
    config: PhaseConfig,
    policy: P,
}

impl<P> External<P>
where
    P: TrainedPolicy,
{
    #[must_use]
    pub fn new(name: &'static str, config: PhaseConfig, policy: P) -> Self {
        Self {
            name,
            config,
            policy,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> P {
        self.policy
    }
}

impl<P> fmt::Debug for External<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("External")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P> ForwardModel for External<P>
where
    P: TrainedPolicy,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn phase_config(&self) -> &PhaseConfig {
        &self.config
    }

    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError> {
        check_input(&self.config, input, phase)?;
        let output = self.policy.predict(input, phase);
        let expected = self.config.output_sizes()[phase];
        if output.len() != expected {
            return Err(ModelError::OutputMismatch {
                phase,
                expected,
                got: output.len(),
            });
        }
        Ok(Action::from_raw(output))
    }
}
