use crate::{
    ModelError,
    action::Action,
    activation::Activation,
    config::{LayerShape, PhaseConfig},
    partition::{self, NetworkShape, Partition},
    reservoir::{Reservoir, ReservoirConfig},
};

use super::{ForwardModel, check_input, feed_forward::forward_layers, warn_unused};

/// Feed-forward phase networks placed behind fixed reservoir projections.
///
/// Phase `p` first projects its observation through reservoir `p`, then runs the learned
/// layers on the readout. Only the learned layers come from the parameter vector, so the
/// first layer of each phase is `readout + 1` rows tall instead of `input_size + 1`.
#[derive(Debug, Clone)]
pub struct EchoState<'p> {
    config: PhaseConfig,
    activation: Activation,
    reservoirs: Vec<Reservoir>,
    partition: Partition<'p>,
}

impl<'p> EchoState<'p> {
    /// Builds the model from prepared reservoirs, one per phase.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the reservoirs do not match the phases, and
    /// [`ModelError::ShapeMismatch`] if `params` is too short.
    pub fn new(
        config: PhaseConfig,
        layers: &LayerShape,
        activation: Activation,
        reservoirs: Vec<Reservoir>,
        params: &'p [f64],
    ) -> Result<Self, ModelError> {
        if reservoirs.len() != config.phase_count() {
            return Err(ModelError::invalid_config(format!(
                "expected {} reservoirs, got {}",
                config.phase_count(),
                reservoirs.len()
            )));
        }
        for (phase, (reservoir, &input_size)) in
            reservoirs.iter().zip(config.input_sizes()).enumerate()
        {
            if reservoir.input_width() != input_size {
                return Err(ModelError::invalid_config(format!(
                    "reservoir of phase {phase} reads {} values, phase input is {input_size}",
                    reservoir.input_width()
                )));
            }
        }

        let widths: Vec<usize> = reservoirs.iter().map(Reservoir::output_width).collect();
        let shape = NetworkShape::with_input_widths(&config, layers, &widths);
        let partition = partition::partition(params, &shape)?;
        warn_unused(&partition, "echo-state");
        Ok(Self {
            config,
            activation,
            reservoirs,
            partition,
        })
    }

    /// Builds one reservoir per phase from `reservoir`, then the model.
    pub fn from_config(
        config: PhaseConfig,
        layers: &LayerShape,
        activation: Activation,
        reservoir: &ReservoirConfig,
        params: &'p [f64],
    ) -> Result<Self, ModelError> {
        let reservoirs = config
            .input_sizes()
            .iter()
            .enumerate()
            .map(|(phase, &input_size)| reservoir.build(input_size, phase))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config, layers, activation, reservoirs, params)
    }

    #[must_use]
    pub fn reservoir(&self, phase: usize) -> Option<&Reservoir> {
        self.reservoirs.get(phase)
    }

    #[must_use]
    pub fn partition(&self) -> &Partition<'p> {
        &self.partition
    }
}

impl ForwardModel for EchoState<'_> {
    fn name(&self) -> &'static str {
        "echo_state"
    }

    fn phase_config(&self) -> &PhaseConfig {
        &self.config
    }

    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError> {
        check_input(&self.config, input, phase)?;
        let projected = self.reservoirs[phase].project(input);
        let output = forward_layers(
            self.partition.phase_matrices(phase),
            self.activation,
            projected,
        );
        Ok(Action::from_raw(output.to_vec()))
    }
}
