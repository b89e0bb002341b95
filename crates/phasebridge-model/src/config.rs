//! Per-game phase dimensions and the shared hidden-layer description.
//!
//! A [`PhaseConfig`] is read from the same game-config JSON the game interfaces use:
//!
//! ```json
//! { "game_phases": 2, "input_sizes": [12, 40], "output_sizes": [5, 8] }
//! ```
//!
//! Validation runs both in [`PhaseConfig::new`] and on deserialization, so a value of this
//! type always has at least one phase and only positive widths.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// How many phases a game has and the observation/action width of each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPhaseConfig", into = "RawPhaseConfig")]
pub struct PhaseConfig {
    input_sizes: Vec<usize>,
    output_sizes: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPhaseConfig {
    game_phases: usize,
    input_sizes: Vec<usize>,
    output_sizes: Vec<usize>,
}

impl TryFrom<RawPhaseConfig> for PhaseConfig {
    type Error = ModelError;

    fn try_from(raw: RawPhaseConfig) -> Result<Self, Self::Error> {
        if raw.input_sizes.len() != raw.game_phases || raw.output_sizes.len() != raw.game_phases {
            return Err(ModelError::invalid_config(format!(
                "game_phases is {}, but {} input sizes and {} output sizes were given",
                raw.game_phases,
                raw.input_sizes.len(),
                raw.output_sizes.len()
            )));
        }
        Self::new(raw.input_sizes, raw.output_sizes)
    }
}

impl From<PhaseConfig> for RawPhaseConfig {
    fn from(config: PhaseConfig) -> Self {
        Self {
            game_phases: config.phase_count(),
            input_sizes: config.input_sizes,
            output_sizes: config.output_sizes,
        }
    }
}

impl PhaseConfig {
    /// Creates a phase configuration from per-phase input and output widths.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if there are no phases, if the two sequences
    /// differ in length, or if any width is zero.
    pub fn new(input_sizes: Vec<usize>, output_sizes: Vec<usize>) -> Result<Self, ModelError> {
        if input_sizes.is_empty() {
            return Err(ModelError::invalid_config("a game needs at least one phase"));
        }
        if input_sizes.len() != output_sizes.len() {
            return Err(ModelError::invalid_config(format!(
                "{} input sizes but {} output sizes",
                input_sizes.len(),
                output_sizes.len()
            )));
        }
        if let Some(phase) = input_sizes.iter().position(|&size| size == 0) {
            return Err(ModelError::invalid_config(format!(
                "phase {phase} has an empty input"
            )));
        }
        if let Some(phase) = output_sizes.iter().position(|&size| size == 0) {
            return Err(ModelError::invalid_config(format!(
                "phase {phase} has an empty output"
            )));
        }
        Ok(Self {
            input_sizes,
            output_sizes,
        })
    }

    /// Creates a configuration for a game with a single phase.
    pub fn single(input_size: usize, output_size: usize) -> Result<Self, ModelError> {
        Self::new(vec![input_size], vec![output_size])
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.input_sizes.len()
    }

    #[must_use]
    pub fn input_sizes(&self) -> &[usize] {
        &self.input_sizes
    }

    #[must_use]
    pub fn output_sizes(&self) -> &[usize] {
        &self.output_sizes
    }

    /// Returns the observation width of `phase`, or `None` if the phase does not exist.
    #[must_use]
    pub fn input_size(&self, phase: usize) -> Option<usize> {
        self.input_sizes.get(phase).copied()
    }

    /// Returns the action width of `phase`, or `None` if the phase does not exist.
    #[must_use]
    pub fn output_size(&self, phase: usize) -> Option<usize> {
        self.output_sizes.get(phase).copied()
    }

    /// Width of the combined action space (all phase action spaces concatenated).
    #[must_use]
    pub fn combined_output_size(&self) -> usize {
        self.output_sizes.iter().sum()
    }
}

/// Widths of the learned hidden layers, shared by every phase network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerShape {
    hidden_layers: Vec<usize>,
}

impl LayerShape {
    #[must_use]
    pub fn new(hidden_layers: Vec<usize>) -> Self {
        Self { hidden_layers }
    }

    #[must_use]
    pub fn hidden_layers(&self) -> &[usize] {
        &self.hidden_layers
    }

    /// Full layer-size sequence `[input] + hidden + [output]` of one phase network.
    #[must_use]
    pub fn layer_sizes(&self, input_size: usize, output_size: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(input_size);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(output_size);
        sizes
    }
}
