//! Fixed, non-trained reservoir projection applied before the learned layers.
//!
//! An echo-state reservoir of `components` units receives `[1, x]` through random input
//! weights drawn once from `U(-0.5, 0.5)`. The unit state starts at zero for every
//! observation, so one update gives
//!
//! ```text
//! state = damping · tanh(W_in · [1, x])
//! ```
//!
//! and the projection reads `readout` of those units, chosen by a seeded permutation. The
//! reservoir is fully determined by its [`ReservoirConfig`], the input width and a seed; its
//! weights never appear in the learned parameter vector and are never updated.

use ndarray::{Array1, Array2};
use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::ModelError;

const fn default_damping() -> f64 {
    0.5
}

/// Size and seeding of the reservoir placed in front of each phase network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservoirConfig {
    /// Number of reservoir units.
    pub components: usize,
    /// Number of units read out; this is the input width of the learned layers.
    pub readout: usize,
    /// Leak factor applied to the unit activations.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Base seed; phase `p` uses `seed + p`.
    #[serde(default)]
    pub seed: u64,
}

impl ReservoirConfig {
    #[must_use]
    pub fn new(components: usize, readout: usize, seed: u64) -> Self {
        Self {
            components,
            readout,
            damping: default_damping(),
            seed,
        }
    }

    /// Checks that `readout` is in `1..=components`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.readout == 0 || self.readout > self.components {
            return Err(ModelError::invalid_config(format!(
                "reservoir readout must be in 1..={}, got {}",
                self.components, self.readout
            )));
        }
        Ok(())
    }

    /// Builds the reservoir of one phase.
    pub fn build(&self, input_width: usize, phase: usize) -> Result<Reservoir, ModelError> {
        Reservoir::new(self, input_width, self.seed.wrapping_add(phase as u64))
    }
}

#[derive(Debug, Clone)]
pub struct Reservoir {
    input_weights: Array2<f64>,
    readout: Vec<usize>,
    damping: f64,
}

impl Reservoir {
    /// Creates a reservoir reading `input_width` values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if `readout` is zero or exceeds `components`.
    pub fn new(
        config: &ReservoirConfig,
        input_width: usize,
        seed: u64,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        let ReservoirConfig {
            components,
            readout,
            damping,
            ..
        } = *config;

        let mut rng = Pcg64::seed_from_u64(seed);
        let input_weights: Array2<f64> =
            Array2::from_shape_fn((components, input_width + 1), |_| rng.random_range(-0.5..0.5));
        let mut units: Vec<usize> = (0..components).collect();
        units.shuffle(&mut rng);
        units.truncate(readout);

        Ok(Self {
            input_weights,
            readout: units,
            damping,
        })
    }

    /// Number of values [`Reservoir::project`] expects.
    #[must_use]
    pub fn input_width(&self) -> usize {
        self.input_weights.ncols() - 1
    }

    /// Number of values [`Reservoir::project`] produces.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.readout.len()
    }

    /// Projects one observation. `input` must be [`Reservoir::input_width`] long.
    #[must_use]
    pub fn project(&self, input: &[f64]) -> Array1<f64> {
        debug_assert_eq!(input.len(), self.input_width());
        let mut u = Array1::<f64>::ones(input.len() + 1);
        for (dst, src) in u.iter_mut().skip(1).zip(input) {
            *dst = *src;
        }
        let units = self.input_weights.dot(&u);
        self.readout
            .iter()
            .map(|&i| self.damping * units[i].tanh())
            .collect()
    }
}
