use ndarray::{Array1, ArrayView2, s};

use crate::{
    ModelError,
    action::Action,
    activation::Activation,
    config::{LayerShape, PhaseConfig},
    partition::{self, NetworkShape, Partition},
};

use super::{ForwardModel, check_input, warn_unused};

/// One fully connected network per phase, sharing a single borrowed parameter vector.
#[derive(Debug, Clone)]
pub struct FeedForward<'p> {
    config: PhaseConfig,
    activation: Activation,
    partition: Partition<'p>,
}

impl<'p> FeedForward<'p> {
    /// Builds the phase networks over `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if `params` is too short for the layer shapes.
    pub fn new(
        config: PhaseConfig,
        layers: &LayerShape,
        activation: Activation,
        params: &'p [f64],
    ) -> Result<Self, ModelError> {
        let shape = NetworkShape::plain(&config, layers);
        let partition = partition::partition(params, &shape)?;
        warn_unused(&partition, "feed-forward");
        Ok(Self {
            config,
            activation,
            partition,
        })
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn partition(&self) -> &Partition<'p> {
        &self.partition
    }
}

impl ForwardModel for FeedForward<'_> {
    fn name(&self) -> &'static str {
        "feed_forward"
    }

    fn phase_config(&self) -> &PhaseConfig {
        &self.config
    }

    fn evaluate(&self, input: &[f64], phase: usize) -> Result<Action, ModelError> {
        check_input(&self.config, input, phase)?;
        let x = Array1::from(input.to_vec());
        let output = forward_layers(self.partition.phase_matrices(phase), self.activation, x);
        Ok(Action::from_raw(output.to_vec()))
    }
}

/// Runs `x` through `weights` in order, appending the bias input before every layer.
pub(crate) fn forward_layers(
    weights: &[ArrayView2<'_, f64>],
    activation: Activation,
    mut x: Array1<f64>,
) -> Array1<f64> {
    for w in weights {
        debug_assert_eq!(w.nrows(), x.len() + 1);
        let mut biased = Array1::<f64>::ones(x.len() + 1);
        biased.slice_mut(s![..x.len()]).assign(&x);
        x = biased.dot(w).mapv_into(|v| activation.apply(v));
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_model(params: &[f64]) -> FeedForward<'_> {
        let config = PhaseConfig::single(2, 2).unwrap();
        FeedForward::new(config, &LayerShape::default(), Activation::Identity, params).unwrap()
    }

    #[test]
    fn test_identity_pass_through() {
        let params = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let model = identity_model(&params);
        let action = model.evaluate(&[3.0, 5.0], 0).unwrap();
        assert_eq!(action.values(), &[0.0, 1.0]);
    }

    #[test]
    fn test_bias_row_is_last() {
        // zero weights, bias row (0.5, 2.0)
        let params = [0.0, 0.0, 0.0, 0.0, 0.5, 2.0];
        let config = PhaseConfig::single(2, 2).unwrap();
        let model =
            FeedForward::new(config, &LayerShape::default(), Activation::Identity, &params)
                .unwrap();
        let raw = forward_layers(
            model.partition().phase_matrices(0),
            Activation::Identity,
            Array1::from(vec![7.0, -7.0]),
        );
        assert_eq!(raw.to_vec(), vec![0.5, 2.0]);
    }

    #[test]
    fn test_hidden_layer_applies_activation() {
        // 1 input → 1 hidden (relu) → 1 output
        // hidden = relu(-1·x + 0), output = relu(1·hidden + 0)
        let params = [-1.0, 0.0, 1.0, 0.0];
        let config = PhaseConfig::single(1, 1).unwrap();
        let model = FeedForward::new(config, &LayerShape::new(vec![1]), Activation::Relu, &params)
            .unwrap();
        let phase = model.partition().phase_matrices(0);
        let positive = forward_layers(phase, Activation::Relu, Array1::from(vec![2.0]));
        let negative = forward_layers(phase, Activation::Relu, Array1::from(vec![-2.0]));
        assert_eq!(positive.to_vec(), vec![0.0]);
        assert_eq!(negative.to_vec(), vec![2.0]);
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let params = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let model = identity_model(&params);
        assert_eq!(
            model.evaluate(&[1.0, 2.0, 3.0], 0),
            Err(ModelError::DimensionMismatch {
                phase: 0,
                expected: 2,
                got: 3,
            })
        );
    }

    #[test]
    fn test_rejects_invalid_phase() {
        let params = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let model = identity_model(&params);
        assert_eq!(
            model.evaluate(&[1.0, 2.0], 1),
            Err(ModelError::InvalidPhase {
                phase: 1,
                phase_count: 1,
            })
        );
    }

    #[test]
    fn test_phases_use_their_own_region() {
        // phase 0: 1 → 1, phase 1: 1 → 2; no hidden layers
        let config = PhaseConfig::new(vec![1, 1], vec![1, 2]).unwrap();
        let params = [1.0, 0.0, 1.0, -1.0, 0.0, 0.0];
        let model =
            FeedForward::new(config, &LayerShape::default(), Activation::Identity, &params)
                .unwrap();

        let phase0 = model.evaluate(&[4.0], 0).unwrap();
        assert_eq!(phase0.values(), &[4.0]);

        let phase1 = model.evaluate(&[4.0], 1).unwrap();
        // raw (4, -4) normalized
        assert_eq!(phase1.values(), &[1.0, 0.0]);
    }

    #[test]
    fn test_padding_is_ignored() {
        let mut params = vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        params.extend([9.0; 4]);
        let model = identity_model(&params);
        assert_eq!(model.partition().unused(), 4);
        assert_eq!(model.evaluate(&[3.0, 5.0], 0).unwrap().values(), &[0.0, 1.0]);
    }

    #[test]
    fn test_evaluate_does_not_touch_params() {
        let params = vec![0.3, -0.2, 0.7, 0.1, 0.05, -0.4];
        let before = params.clone();
        let model = identity_model(&params);
        let first = model.evaluate(&[1.0, 2.0], 0).unwrap();
        let second = model.evaluate(&[1.0, 2.0], 0).unwrap();
        assert_eq!(first, second);
        assert_eq!(params, before);
    }
}
