//! Forward models: mapping an observation and a phase to an action.
//!
//! Every policy the controller can drive implements [`ForwardModel`]:
//!
//! - [`FeedForward`] - one learned network per phase, carved out of a flat parameter vector
//! - [`EchoState`] - a fixed reservoir projection per phase followed by learned layers
//! - [`Baseline`] - a non-learned policy used as a comparison point
//! - [`External`] - adapter around a policy trained and loaded elsewhere
//!
//! Learned variants borrow the parameter vector for their whole lifetime (`'p`) and never
//! mutate it, so the same vector can back models running on several threads at once.
//!
//! # Building from a description
//!
//! [`ModelSpec`] is the serializable description of an architecture. It answers how long the
//! optimizer's parameter vector must be, and builds the model once a vector is available:
//!
//! ```
//! use phasebridge_model::{
//!     config::PhaseConfig,
//!     model::{ForwardModel as _, ModelSpec},
//! };
//!
//! let game = PhaseConfig::new(vec![4, 6], vec![2, 3]).unwrap();
//! let spec: ModelSpec = serde_json::from_str(
//!     r#"{ "type": "feed_forward", "hidden_layers": [5], "activation": "relu" }"#,
//! )
//! .unwrap();
//!
//! // phase 0: (4+1)·5 + (5+1)·2, phase 1: (6+1)·5 + (5+1)·3
//! assert_eq!(spec.parameter_count(&game).unwrap(), 37 + 53);
//!
//! let params = vec![0.1; 90];
//! let model = spec.build(&game, &params).unwrap();
//! assert_eq!(model.evaluate(&[1.0; 6], 1).unwrap().len(), 3);
//! ```

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    ModelError,
    action::Action,
    activation::Activation,
    config::{LayerShape, PhaseConfig},
    partition::{NetworkShape, Partition},
    reservoir::ReservoirConfig,
};

pub use self::{baseline::*, echo_state::*, external::*, feed_forward::*};

mod baseline;
mod echo_state;
mod external;
mod feed_forward;

/// A policy that produces an action for the current phase of a game.
pub trait ForwardModel: fmt::Debug + Send + Sync {
    /// Short identifier of the model kind.
    fn name(&self) -> &'static str;

    /// Phase dimensions this model was built for.
    fn phase_config(&self) -> &PhaseConfig;

    /// Runs one forward pass.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPhase`] if `phase` is outside `[0, phase_count)` and
    /// [`ModelError::DimensionMismatch`] if `input` does not have the phase's observation width.
    /// An unknown phase gets its own variant rather than being folded into a dimension
    /// mismatch, since there is no expected width to report.
    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError>;

    fn phase_count(&self) -> usize {
        self.phase_config().phase_count()
    }

    fn input_size(&self, phase: usize) -> Option<usize> {
        self.phase_config().input_size(phase)
    }

    fn output_size(&self, phase: usize) -> Option<usize> {
        self.phase_config().output_size(phase)
    }
}

impl<M> ForwardModel for Box<M>
where
    M: ForwardModel + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn phase_config(&self) -> &PhaseConfig {
        (**self).phase_config()
    }

    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError> {
        (**self).evaluate(input, phase)
    }
}

/// Checks an observation against the phase configuration.
pub(crate) fn check_input(
    config: &PhaseConfig,
    input: &[f64],
    phase: usize,
) -> Result<(), ModelError> {
    let expected = config.input_size(phase).ok_or(ModelError::InvalidPhase {
        phase,
        phase_count: config.phase_count(),
    })?;
    if input.len() != expected {
        return Err(ModelError::DimensionMismatch {
            phase,
            expected,
            got: input.len(),
        });
    }
    Ok(())
}

fn warn_unused(partition: &Partition<'_>, model: &str) {
    let unused = partition.unused();
    if unused > 0 {
        warn!(
            "{model} model uses {} parameters, ignoring {unused} trailing values",
            partition.consumed()
        );
    }
}

/// Builds a plain feed-forward model over `params`.
pub fn build_model<'p>(
    config: PhaseConfig,
    layers: &LayerShape,
    activation: Activation,
    params: &'p [f64],
) -> Result<FeedForward<'p>, ModelError> {
    FeedForward::new(config, layers, activation, params)
}

/// Serializable description of a model architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    FeedForward {
        #[serde(default)]
        hidden_layers: LayerShape,
        #[serde(default)]
        activation: Activation,
    },
    EchoState {
        #[serde(default)]
        hidden_layers: LayerShape,
        #[serde(default)]
        activation: Activation,
        reservoir: ReservoirConfig,
    },
    Baseline {
        policy: BaselinePolicy,
        #[serde(default)]
        seed: u64,
    },
}

impl ModelSpec {
    /// Shape of the learned networks, or `None` for non-learned models.
    #[must_use]
    pub fn network_shape(&self, config: &PhaseConfig) -> Option<NetworkShape> {
        match self {
            Self::FeedForward { hidden_layers, .. } => {
                Some(NetworkShape::plain(config, hidden_layers))
            }
            Self::EchoState {
                hidden_layers,
                reservoir,
                ..
            } => {
                let widths = vec![reservoir.readout; config.phase_count()];
                Some(NetworkShape::with_input_widths(
                    config,
                    hidden_layers,
                    &widths,
                ))
            }
            Self::Baseline { .. } => None,
        }
    }

    /// Length of the parameter vector this model consumes for `config`.
    pub fn parameter_count(&self, config: &PhaseConfig) -> Result<usize, ModelError> {
        if let Self::EchoState { reservoir, .. } = self {
            reservoir.validate()?;
        }
        self.network_shape(config)
            .map_or(Ok(0), |shape| shape.parameter_count())
    }

    /// Builds the described model over `params`.
    pub fn build<'p>(
        &self,
        config: &PhaseConfig,
        params: &'p [f64],
    ) -> Result<Box<dyn ForwardModel + 'p>, ModelError> {
        let model: Box<dyn ForwardModel + 'p> = match self {
            Self::FeedForward {
                hidden_layers,
                activation,
            } => Box::new(FeedForward::new(
                config.clone(),
                hidden_layers,
                *activation,
                params,
            )?),
            Self::EchoState {
                hidden_layers,
                activation,
                reservoir,
            } => Box::new(EchoState::from_config(
                config.clone(),
                hidden_layers,
                *activation,
                reservoir,
                params,
            )?),
            Self::Baseline { policy, seed } => {
                Box::new(Baseline::new(config.clone(), *policy, *seed))
            }
        };
        Ok(model)
    }

    /// One-line human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::FeedForward {
                hidden_layers,
                activation,
            } => format!(
                "feed-forward hidden_layers: {:?}, activation: {activation}",
                hidden_layers.hidden_layers()
            ),
            Self::EchoState {
                hidden_layers,
                activation,
                reservoir,
            } => format!(
                "echo-state-size: {}, readout: {}, hidden_layers: {:?}, activation: {activation}",
                reservoir.components,
                reservoir.readout,
                hidden_layers.hidden_layers()
            ),
            Self::Baseline { policy, seed } => format!("baseline policy: {policy}, seed: {seed}"),
        }
    }
}
