//! Slicing one flat parameter vector into per-phase weight matrices.
//!
//! A checkpoint is a single shared parameter space: every phase network occupies a disjoint,
//! contiguous region, laid out in ascending phase order and, within a phase, in layer order.
//!
//! # Layout
//!
//! For a phase whose layer sizes are `[s₀, s₁, …, sₖ]`, boundary `i` owns a matrix of shape
//! `(sᵢ + 1, sᵢ₊₁)`; the extra row holds the weights of the bias input. The cursor walks
//! boundaries phase by phase and is never reset, so a single-phase game simply consumes
//! everything once:
//!
//! ```text
//! | phase 0: W₀ W₁ … | phase 1: W₀ W₁ … | … | unused padding |
//! ```
//!
//! The layout is computed once into a [`PartitionLayout`] (an arena of slots indexed by
//! `(phase, layer)`), then [`partition`] creates zero-copy [`ArrayView2`]s over the borrowed
//! parameters. The same inputs always yield the same views.
//!
//! Trailing elements past the last phase are tolerated and reported by
//! [`Partition::unused`]; a vector that is too short is a [`ModelError::ShapeMismatch`].

use std::ops::Range;

use ndarray::ArrayView2;

use crate::{
    ModelError,
    config::{LayerShape, PhaseConfig},
};

/// Layer-size sequences of every phase network, in phase order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkShape {
    phases: Vec<Vec<usize>>,
}

impl NetworkShape {
    /// Creates a shape from explicit per-phase layer-size sequences.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if there are no phases or a phase has fewer than
    /// two layers (an input and an output).
    pub fn new(phases: Vec<Vec<usize>>) -> Result<Self, ModelError> {
        if phases.is_empty() {
            return Err(ModelError::invalid_config("a network needs at least one phase"));
        }
        if let Some(phase) = phases.iter().position(|sizes| sizes.len() < 2) {
            return Err(ModelError::invalid_config(format!(
                "phase {phase} needs at least an input and an output layer"
            )));
        }
        Ok(Self { phases })
    }

    /// Shape of plain networks: each phase reads its own observation width.
    #[must_use]
    pub fn plain(config: &PhaseConfig, layers: &LayerShape) -> Self {
        Self::with_input_widths(config, layers, config.input_sizes())
    }

    /// Shape of networks whose learned part reads `input_widths[phase]` values per phase,
    /// e.g. the output of a fixed projection.
    ///
    /// # Panics
    ///
    /// Panics if `input_widths` does not have one entry per phase.
    #[must_use]
    pub fn with_input_widths(
        config: &PhaseConfig,
        layers: &LayerShape,
        input_widths: &[usize],
    ) -> Self {
        assert_eq!(input_widths.len(), config.phase_count());
        let phases = input_widths
            .iter()
            .zip(config.output_sizes())
            .map(|(&input, &output)| layers.layer_sizes(input, output))
            .collect();
        Self { phases }
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub fn layer_sizes(&self, phase: usize) -> Option<&[usize]> {
        self.phases.get(phase).map(Vec::as_slice)
    }

    /// Number of parameters consumed by one phase network.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for an unknown phase or if the count overflows.
    pub fn phase_parameter_count(&self, phase: usize) -> Result<usize, ModelError> {
        let sizes = self.phases.get(phase).ok_or_else(|| {
            ModelError::invalid_config(format!("network has no phase {phase}"))
        })?;
        layer_parameter_count(sizes)
    }

    /// Total number of parameters consumed by all phases: `Σ_phase Σ_i (sᵢ + 1)·sᵢ₊₁`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the layer sizes are too large to address.
    pub fn parameter_count(&self) -> Result<usize, ModelError> {
        self.phases.iter().try_fold(0_usize, |total, sizes| {
            total
                .checked_add(layer_parameter_count(sizes)?)
                .ok_or_else(too_many_parameters)
        })
    }
}

fn too_many_parameters() -> ModelError {
    ModelError::invalid_config("layer sizes need more parameters than can be addressed")
}

fn matrix_len(input: usize, output: usize) -> Result<usize, ModelError> {
    input
        .checked_add(1)
        .and_then(|rows| rows.checked_mul(output))
        .ok_or_else(too_many_parameters)
}

fn layer_parameter_count(sizes: &[usize]) -> Result<usize, ModelError> {
    sizes.windows(2).try_fold(0_usize, |total, w| {
        total
            .checked_add(matrix_len(w[0], w[1])?)
            .ok_or_else(too_many_parameters)
    })
}

/// Location of one weight matrix inside the parameter vector.
///
/// Slots come from a [`PartitionLayout`], which guarantees `offset + rows * cols` fits in a
/// `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSlot {
    pub offset: usize,
    pub rows: usize,
    pub cols: usize,
}

impl MatrixSlot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len()
    }
}

/// Offsets and shapes of every weight matrix, indexed by `(phase, layer)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLayout {
    slots: Vec<MatrixSlot>,
    phase_starts: Vec<usize>,
    total_len: usize,
}

impl PartitionLayout {
    /// Lays out every matrix of `shape` behind one running cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the layout does not fit in a `usize`.
    pub fn new(shape: &NetworkShape) -> Result<Self, ModelError> {
        let mut slots = Vec::new();
        let mut phase_starts = Vec::with_capacity(shape.phase_count() + 1);
        let mut cursor: usize = 0;
        for sizes in &shape.phases {
            phase_starts.push(slots.len());
            for w in sizes.windows(2) {
                let len = matrix_len(w[0], w[1])?;
                slots.push(MatrixSlot {
                    offset: cursor,
                    rows: w[0] + 1,
                    cols: w[1],
                });
                cursor = cursor.checked_add(len).ok_or_else(too_many_parameters)?;
            }
        }
        phase_starts.push(slots.len());
        Ok(Self {
            slots,
            phase_starts,
            total_len: cursor,
        })
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phase_starts.len() - 1
    }

    /// Slots of one phase, in layer order. Empty for an unknown phase.
    #[must_use]
    pub fn phase_slots(&self, phase: usize) -> &[MatrixSlot] {
        self.phase_range(phase)
            .map_or(&[][..], |range| &self.slots[range])
    }

    #[must_use]
    pub fn slot(&self, phase: usize, layer: usize) -> Option<MatrixSlot> {
        self.phase_slots(phase).get(layer).copied()
    }

    /// Number of parameters the layout consumes.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Checks that `available` parameters cover every slot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] naming the first `(phase, boundary)` whose slot
    /// runs past the end of the vector.
    pub fn check_len(&self, available: usize) -> Result<(), ModelError> {
        for phase in 0..self.phase_count() {
            for (boundary, slot) in self.phase_slots(phase).iter().enumerate() {
                if slot.range().end > available {
                    return Err(ModelError::ShapeMismatch {
                        phase,
                        boundary,
                        required: self.total_len,
                        available,
                    });
                }
            }
        }
        Ok(())
    }

    fn phase_range(&self, phase: usize) -> Option<Range<usize>> {
        let start = *self.phase_starts.get(phase)?;
        let end = *self.phase_starts.get(phase + 1)?;
        Some(start..end)
    }
}

/// Weight matrices of every phase, viewed in place over a borrowed parameter vector.
#[derive(Debug, Clone)]
pub struct Partition<'p> {
    layout: PartitionLayout,
    views: Vec<ArrayView2<'p, f64>>,
    available: usize,
}

/// Slices `params` into the weight matrices described by `shape`.
///
/// # Errors
///
/// Returns [`ModelError::ShapeMismatch`] if `params` is shorter than
/// [`NetworkShape::parameter_count`] and [`ModelError::InvalidConfig`] if that count overflows.
/// Extra trailing values are not an error.
pub fn partition<'p>(params: &'p [f64], shape: &NetworkShape) -> Result<Partition<'p>, ModelError> {
    let layout = PartitionLayout::new(shape)?;
    layout.check_len(params.len())?;
    let views = layout
        .slots
        .iter()
        .map(|slot| {
            ArrayView2::from_shape((slot.rows, slot.cols), &params[slot.range()])
                .expect("slot length always equals rows * cols")
        })
        .collect();
    Ok(Partition {
        layout,
        views,
        available: params.len(),
    })
}

impl<'p> Partition<'p> {
    #[must_use]
    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.layout.phase_count()
    }

    /// Returns the matrix at `(phase, layer)`.
    #[must_use]
    pub fn matrix(&self, phase: usize, layer: usize) -> Option<&ArrayView2<'p, f64>> {
        let range = self.layout.phase_range(phase)?;
        self.views[range].get(layer)
    }

    /// Matrices of one phase in layer order. Empty for an unknown phase.
    #[must_use]
    pub fn phase_matrices(&self, phase: usize) -> &[ArrayView2<'p, f64>] {
        self.layout
            .phase_range(phase)
            .map_or(&[][..], |range| &self.views[range])
    }

    /// All matrices, one inner vector per phase.
    #[must_use]
    pub fn to_matrices(&self) -> Vec<Vec<ArrayView2<'p, f64>>> {
        (0..self.phase_count())
            .map(|phase| self.phase_matrices(phase).to_vec())
            .collect()
    }

    /// Number of parameters covered by the matrices.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.layout.total_len()
    }

    /// Number of trailing parameters no matrix covers.
    #[must_use]
    pub fn unused(&self) -> usize {
        self.available - self.layout.total_len()
    }
}
