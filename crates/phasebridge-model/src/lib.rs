//! Phase-aware parametric policies for black-box game agents.
//!
//! A game played by these agents proceeds through distinct *phases* (for example a bidding
//! phase followed by a placement phase), each with its own observation and action width. An
//! outer optimizer produces one flat parameter vector; this crate turns that vector into one
//! feed-forward network per phase and evaluates them.
//!
//! # Architecture
//!
//! ```text
//! Flat parameter vector (&[f64], borrowed)
//!     ↓ sliced by
//! Partition (running cursor over phases, then layers)
//!     ↓ viewed as
//! Weight matrices ((rows + 1) × cols, one per layer boundary and phase)
//!     ↓ evaluated by
//! ForwardModel (plain / reservoir-projected / baseline / external)
//!     ↓ post-processed into
//! Action (min–max normalized, encoded as a space-separated text line)
//! ```
//!
//! # Modules
//!
//! - [`config`] - [`PhaseConfig`](config::PhaseConfig) and [`LayerShape`](config::LayerShape)
//! - [`partition`] - Shape descriptor and zero-copy slicing of the parameter vector
//! - [`activation`] - Elementwise activation functions
//! - [`reservoir`] - Fixed, non-trained reservoir projection
//! - [`model`] - The [`ForwardModel`](model::ForwardModel) capability and its variants
//! - [`action`] - Output normalization and the action-line text encoding
//!
//! # Example
//!
//! ```
//! use phasebridge_model::{
//!     activation::Activation,
//!     config::{LayerShape, PhaseConfig},
//!     model::{self, ForwardModel},
//! };
//!
//! let config = PhaseConfig::new(vec![2], vec![2]).unwrap();
//! let layers = LayerShape::new(vec![]);
//! // (2 inputs + bias) × 2 outputs
//! let params = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
//! let model = model::build_model(config, &layers, Activation::Identity, &params).unwrap();
//!
//! let action = model.evaluate(&[3.0, 5.0], 0).unwrap();
//! assert_eq!(action.to_line(), "0.0 1.0");
//! ```

pub mod action;
pub mod activation;
pub mod config;
pub mod model;
pub mod partition;
pub mod reservoir;

/// Errors raised while building or evaluating phase models.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ModelError {
    /// The parameter vector is shorter than the declared layer shapes require.
    #[display(
        "parameter vector exhausted at phase {phase}, boundary {boundary}: {required} values required, {available} available"
    )]
    ShapeMismatch {
        phase: usize,
        boundary: usize,
        required: usize,
        available: usize,
    },
    /// An input vector does not match the width of the requested phase.
    #[display("phase {phase} expects {expected} inputs, got {got}")]
    DimensionMismatch {
        phase: usize,
        expected: usize,
        got: usize,
    },
    /// A phase index outside `[0, phase_count)`.
    #[display("phase {phase} is out of range for a model with {phase_count} phases")]
    InvalidPhase { phase: usize, phase_count: usize },
    /// An externally trained policy produced an output of the wrong width.
    #[display("phase {phase} expects {expected} outputs, policy produced {got}")]
    OutputMismatch {
        phase: usize,
        expected: usize,
        got: usize,
    },
    /// Sizes or component counts that cannot describe a network.
    #[display("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ModelError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
